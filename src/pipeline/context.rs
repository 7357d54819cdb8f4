//! Inputs for one project run

use crate::capture::{CaptureLoader, CapturedData};
use crate::fs::FileSystem;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// One scanned project: where it lives and what the capture step found
#[derive(Debug, Clone)]
pub struct ProjectInput {
    pub app_path: PathBuf,
    /// Project name used for artifact and app name fallbacks
    pub basename: String,
    pub captured: CapturedData,
}

impl ProjectInput {
    /// Basename defaults to the last component of `app_path`
    pub fn new(app_path: impl Into<PathBuf>, captured: CapturedData) -> Self {
        let app_path = app_path.into();
        let basename = app_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            app_path,
            basename,
            captured,
        }
    }

    /// Loads the captured data from a capture directory
    pub fn load(fs: &dyn FileSystem, app_path: impl Into<PathBuf>, capture_dir: &Path) -> Result<Self> {
        let captured = CaptureLoader::new(fs).load(capture_dir)?;
        Ok(Self::new(app_path, captured))
    }

    pub fn with_basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = basename.into();
        self
    }
}
