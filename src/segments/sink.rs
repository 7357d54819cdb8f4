use super::SegmentError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

pub const FULL_TEMPLATE_FILE: &str = "Dockerfile-full_template";

/// Destination of the rendered artifact
pub trait ArtifactSink: Send + Sync {
    fn persist(&self, rendered: &str) -> Result<(), SegmentError>;
}

/// Writes `Dockerfile-full_template` into an output directory
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn target(&self) -> PathBuf {
        self.output_dir.join(FULL_TEMPLATE_FILE)
    }
}

fn persist_error(path: &Path, e: std::io::Error) -> SegmentError {
    SegmentError::Persist {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

impl ArtifactSink for FileSink {
    fn persist(&self, rendered: &str) -> Result<(), SegmentError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| persist_error(&self.output_dir, e))?;
        let target = self.target();
        std::fs::write(&target, rendered).map_err(|e| persist_error(&target, e))?;
        info!(path = %target.display(), bytes = rendered.len(), "Wrote artifact");
        Ok(())
    }
}

/// Keeps every persisted artifact in memory
#[derive(Default)]
pub struct MemorySink {
    artifacts: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<String> {
        self.artifacts
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }
}

impl ArtifactSink for MemorySink {
    fn persist(&self, rendered: &str) -> Result<(), SegmentError> {
        if let Ok(mut artifacts) = self.artifacts.lock() {
            artifacts.push(rendered.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_sink_creates_directory() {
        let temp = TempDir::new().unwrap();
        let sink = FileSink::new(temp.path().join("out"));
        sink.persist("FROM scratch\n\n").unwrap();

        let written = std::fs::read_to_string(temp.path().join("out").join(FULL_TEMPLATE_FILE)).unwrap();
        assert_eq!(written, "FROM scratch\n\n");
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.persist("a").unwrap();
        sink.persist("b").unwrap();
        assert_eq!(sink.artifacts(), vec!["a".to_string(), "b".to_string()]);
    }
}
