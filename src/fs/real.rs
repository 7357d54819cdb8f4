use super::{DirEntry, FileSystem, FileType};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// FileSystem backed by the host disk
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let entries =
            fs::read_dir(path).with_context(|| format!("Failed to read directory {:?}", path))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            let file_type = if path.is_file() {
                FileType::File
            } else if path.is_dir() {
                FileType::Directory
            } else {
                FileType::Other
            };

            result.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                file_type,
            });
        }

        Ok(result)
    }

    fn walk_dirs(&self, root: &Path) -> Vec<PathBuf> {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.into_path())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_existing_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("pom.xml");
        fs::write(&file, "<project/>").unwrap();

        let real = RealFileSystem::new();
        assert!(real.is_file(&file));
        assert_eq!(real.read_to_string(&file).unwrap(), "<project/>");
    }

    #[test]
    fn test_read_missing_file_has_context() {
        let real = RealFileSystem::new();
        let err = real
            .read_to_string(Path::new("/definitely/not/here.xml"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_walk_dirs_matches_trait_ordering() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("main/liberty/config")).unwrap();
        fs::create_dir_all(src.join("main/java")).unwrap();

        let dirs = RealFileSystem::new().walk_dirs(&src);
        assert_eq!(
            dirs,
            vec![
                src.clone(),
                src.join("main"),
                src.join("main/java"),
                src.join("main/liberty"),
                src.join("main/liberty/config"),
            ]
        );
    }

    #[test]
    fn test_walk_dirs_missing_root() {
        let temp = TempDir::new().unwrap();
        assert!(RealFileSystem::new()
            .walk_dirs(&temp.path().join("src"))
            .is_empty());
    }
}
