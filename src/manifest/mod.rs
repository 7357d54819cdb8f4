//! Memory and start-command overrides from Cloud Foundry style manifests

use crate::capture::{CapturedData, FileCategory};
use crate::diagnostics::{Diagnostics, Stage};
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const MANIFEST_MARKER: &str = "manifest";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppManifest {
    pub name: String,
    pub memory: String,
    pub command: String,
}

/// Manifest file → one list of applications per YAML document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlatformParams {
    pub manifests: BTreeMap<PathBuf, Vec<Vec<AppManifest>>>,
}

impl PlatformParams {
    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    /// Every application across files and documents
    pub fn applications(&self) -> impl Iterator<Item = &AppManifest> {
        self.manifests.values().flatten().flatten()
    }
}

pub struct ManifestExtractor<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> ManifestExtractor<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    pub fn extract(&self, captured: &CapturedData, diagnostics: &mut Diagnostics) -> PlatformParams {
        let mut params = PlatformParams::default();

        for path in captured.files(FileCategory::Yml) {
            if !is_manifest(path) {
                continue;
            }

            let parsed = self
                .fs
                .read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|content| parse_manifest(&content).map_err(|e| e.to_string()));

            match parsed {
                Ok(documents) => {
                    debug!(path = %path.display(), documents = documents.len(), "Parsed manifest");
                    params.manifests.insert(path.clone(), documents);
                }
                Err(e) => diagnostics.warn(
                    Stage::Manifest,
                    format!("Skipping manifest {}: {}", path.display(), e),
                ),
            }
        }

        params
    }
}

fn is_manifest(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().contains(MANIFEST_MARKER))
        .unwrap_or(false)
}

/// Applications per document of a multi-document stream; null documents are skipped
pub fn parse_manifest(content: &str) -> Result<Vec<Vec<AppManifest>>, serde_yaml::Error> {
    let mut documents = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }

        let apps = value
            .get("applications")
            .and_then(Value::as_sequence)
            .map(|apps| apps.iter().map(app_manifest).collect())
            .unwrap_or_default();
        documents.push(apps);
    }

    Ok(documents)
}

fn app_manifest(app: &Value) -> AppManifest {
    AppManifest {
        name: scalar(app.get("name")),
        memory: scalar(app.get("memory")),
        command: scalar(app.get("command")),
    }
}

fn scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
