use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// In-memory file tree used by unit tests.
///
/// Relative paths are resolved against the mock root (`/mock` by default);
/// parent directories are created implicitly.
pub struct MockFileSystem {
    entries: RwLock<BTreeMap<PathBuf, Option<String>>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) -> PathBuf {
        let path = self.normalize(path.as_ref());
        let mut entries = self.entries.write().unwrap();
        if let Some(parent) = path.parent() {
            Self::ensure_dirs(&mut entries, parent);
        }
        entries.insert(path.clone(), Some(content.to_string()));
        path
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = self.normalize(path.as_ref());
        let mut entries = self.entries.write().unwrap();
        Self::ensure_dirs(&mut entries, &path);
        path
    }

    fn normalize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_dirs(entries: &mut BTreeMap<PathBuf, Option<String>>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            entries.entry(current.clone()).or_insert(None);
        }
    }

    fn lookup(&self, path: &Path) -> Option<Option<String>> {
        let path = self.normalize(path);
        self.entries.read().unwrap().get(&path).cloned()
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.lookup(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lookup(path), Some(None))
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lookup(path), Some(Some(_)))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.lookup(path) {
            Some(Some(content)) => Ok(content),
            Some(None) => Err(anyhow!("Not a file: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.normalize(path);
        let entries = self.entries.read().unwrap();

        match entries.get(&path) {
            Some(None) => {}
            _ => return Err(anyhow!("Directory not found: {:?}", path)),
        }

        Ok(entries
            .iter()
            .filter(|(p, _)| p.parent() == Some(path.as_path()))
            .map(|(p, content)| DirEntry {
                path: p.clone(),
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                file_type: if content.is_some() {
                    FileType::File
                } else {
                    FileType::Directory
                },
            })
            .collect())
    }
}
