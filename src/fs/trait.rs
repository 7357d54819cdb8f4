//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Other,
}

/// A directory entry returned by read_dir
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// Read-only view of the project tree consumed by the extraction stages
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Immediate children of a directory, in no particular order
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Every directory under `root` (inclusive), depth-first and sorted by path.
    /// A missing root yields an empty list.
    fn walk_dirs(&self, root: &Path) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if !self.is_dir(root) {
            return dirs;
        }

        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            let mut children: Vec<PathBuf> = self
                .read_dir(&dir)
                .map(|entries| {
                    entries
                        .into_iter()
                        .filter(DirEntry::is_dir)
                        .map(|e| e.path)
                        .collect()
                })
                .unwrap_or_default();
            children.sort();
            children.reverse();
            stack.extend(children);
            dirs.push(dir);
        }

        dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_entry_accessors() {
        let entry = DirEntry {
            path: PathBuf::from("/app/src"),
            name: "src".to_string(),
            file_type: FileType::Directory,
        };
        assert_eq!(entry.path(), Path::new("/app/src"));
        assert_eq!(entry.file_name(), "src");
        assert!(entry.is_dir());
    }
}
