use super::{BuildType, CapturedData, FileCategory};
use crate::fs::FileSystem;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const GRADLE_DEPENDENCIES_FILE: &str = "gradle_dependencies.output";

/// Reads a capture directory: one `<category>.output` file per category with
/// one path per line, plus the raw gradle dependency dump.
pub struct CaptureLoader<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> CaptureLoader<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    pub fn load(&self, capture_dir: &Path) -> Result<CapturedData> {
        if !self.fs.is_dir(capture_dir) {
            anyhow::bail!("Capture directory {:?} does not exist", capture_dir);
        }

        let mut captured = Vec::new();
        for category in FileCategory::all_variants() {
            let lines = self.read_lines(&capture_dir.join(format!("{}.output", category)))?;
            debug!(category = %category, count = lines.len(), "Loaded capture category");
            captured.push((*category, lines));
        }

        let build_type = derive_build_type(&captured);
        let mut data = CapturedData::new(build_type);
        for (category, lines) in captured {
            if !lines.is_empty() {
                data = data.with_files(category, lines.into_iter().map(PathBuf::from));
            }
        }

        let dependencies = self.read_lines(&capture_dir.join(GRADLE_DEPENDENCIES_FILE))?;
        Ok(data.with_dependency_listing(dependencies))
    }

    fn read_lines(&self, path: &Path) -> Result<Vec<String>> {
        if !self.fs.is_file(path) {
            return Ok(Vec::new());
        }

        let content = self
            .fs
            .read_to_string(path)
            .with_context(|| format!("Failed to read capture file {:?}", path))?;

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Gradle if gradle files exist, Maven overrides Gradle, otherwise undefined
fn derive_build_type(captured: &[(FileCategory, Vec<String>)]) -> BuildType {
    let has = |wanted: FileCategory| {
        captured
            .iter()
            .any(|(category, lines)| *category == wanted && !lines.is_empty())
    };

    if has(FileCategory::MavenBuild) {
        BuildType::Maven
    } else if has(FileCategory::GradleBuild) {
        BuildType::Gradle
    } else {
        BuildType::Undefined
    }
}
