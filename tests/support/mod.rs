//! On-disk project fixtures: an app directory plus the capture directory a
//! scan would have produced for it.

use segbox::{FileCategory, ProjectInput, RealFileSystem};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct ProjectFixture {
    root: TempDir,
    name: String,
    captured: BTreeMap<FileCategory, Vec<PathBuf>>,
    dependency_listing: Vec<String>,
}

#[allow(dead_code)]
impl ProjectFixture {
    pub fn new(name: &str) -> Self {
        let root = TempDir::new().expect("tempdir");
        fs::create_dir_all(root.path().join(name)).expect("app dir");
        Self {
            root,
            name: name.to_string(),
            captured: BTreeMap::new(),
            dependency_listing: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn app_path(&self) -> PathBuf {
        self.root.path().join(&self.name)
    }

    pub fn capture_dir(&self) -> PathBuf {
        self.root.path().join(format!("capture-{}", self.name))
    }

    /// Writes a file relative to the workspace root without capturing it
    pub fn write_raw(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir");
        }
        fs::write(&path, content).expect("write fixture file");
        path
    }

    /// Writes a file under the app directory and records it in a capture category
    pub fn file(mut self, category: FileCategory, relative: &str, content: &str) -> Self {
        let path = self.write_raw(&format!("{}/{}", self.name, relative), content);
        self.captured.entry(category).or_default().push(path);
        self
    }

    pub fn dir(self, relative: &str) -> Self {
        fs::create_dir_all(self.app_path().join(relative)).expect("fixture dir");
        self
    }

    pub fn dependency_listing(mut self, lines: &[&str]) -> Self {
        self.dependency_listing = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Writes the `<category>.output` files
    pub fn write_capture(&self) -> PathBuf {
        let dir = self.capture_dir();
        fs::create_dir_all(&dir).expect("capture dir");
        for (category, paths) in &self.captured {
            let lines: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            fs::write(dir.join(format!("{}.output", category)), lines.join("\n") + "\n")
                .expect("capture file");
        }
        if !self.dependency_listing.is_empty() {
            fs::write(
                dir.join(segbox::capture::GRADLE_DEPENDENCIES_FILE),
                self.dependency_listing.join("\n"),
            )
            .expect("dependency listing");
        }
        dir
    }

    pub fn input(&self) -> ProjectInput {
        let capture_dir = self.write_capture();
        ProjectInput::load(&RealFileSystem::new(), self.app_path(), &capture_dir)
            .expect("load capture")
    }
}

pub const SPRING_BOOT_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>inventory</artifactId>
  <version>1.2.0</version>
  <properties>
    <java.version>17</java.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>org.springframework.boot</groupId>
      <artifactId>spring-boot-starter-web</artifactId>
    </dependency>
  </dependencies>
</project>
"#;

pub const PLAIN_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>legacy</artifactId>
  <version>0.9</version>
</project>
"#;
