//! Java version discovery from `docker inspect` dumps
//!
//! Images rarely label their Java level, so it is recovered from the shell
//! commands recorded in the image history: an explicit `JAVA_VERSION=` wins,
//! otherwise the first token mentioning Java is split into key/value pairs
//! (`java-11-openjdk-devel` → `{java: 11, openjdk: devel}`).

use super::{CatalogError, CompatibilityTable, ImageConfig, ImageMetadataCatalog};
use crate::fs::FileSystem;
use crate::server::ServerType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

const JAVA_MARKERS: &[&str] = &["java", "JAVA_VERSION"];
const EXCLUDED_MARKERS: &[&str] = &["JAVA_HOME"];
const JAVA_VERSION_ASSIGNMENT: &str = "JAVA_VERSION=";
const SEGMENT_KEYS: &[&str] = &["java", "openjdk", "jdk"];

/// Family → tag → summary of one inspected image
pub type ConsolidatedImages = BTreeMap<ServerType, BTreeMap<String, ConsolidatedEntry>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedEntry {
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub java: Option<BTreeMap<String, String>>,
}

impl ConsolidatedEntry {
    pub fn java_version(&self) -> Option<&str> {
        let java = self.java.as_ref()?;
        ["java", "jdk", "openjdk"]
            .iter()
            .find_map(|key| java.get(*key))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub created_by: Option<String>,
}

/// The fields of an image inspect document this module reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageInspect {
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub config: Option<ImageConfig>,
}

/// Result of scanning an images directory
#[derive(Debug, Clone, Default)]
pub struct DerivedImages {
    pub consolidated: ConsolidatedImages,
    pub configs: ImageMetadataCatalog,
}

fn candidate_tokens(history: &[HistoryEntry]) -> Vec<&str> {
    history
        .iter()
        .filter_map(|h| h.created_by.as_deref())
        .flat_map(|cmd| cmd.split(' '))
        .filter(|token| JAVA_MARKERS.iter().any(|m| token.contains(m)))
        .filter(|token| !EXCLUDED_MARKERS.iter().any(|m| token.contains(m)))
        .collect()
}

/// `jdk8u292-b10` style names map to `1.8`; anything else is kept as is
fn numericalize(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        value.to_string()
    } else if value.contains("jdk8u") {
        "1.8".to_string()
    } else {
        value.to_string()
    }
}

/// Position of `jdk` outside any `openjdk`
fn standalone_jdk(token: &str) -> Option<usize> {
    token
        .match_indices("jdk")
        .map(|(i, _)| i)
        .find(|&i| i < 4 || token.get(i - 4..i) != Some("open"))
}

fn segment(token: &str) -> BTreeMap<String, String> {
    let mut positions: Vec<(&str, usize)> = SEGMENT_KEYS
        .iter()
        .filter_map(|key| {
            let pos = if *key == "jdk" {
                standalone_jdk(token)
            } else {
                token.find(key)
            };
            pos.map(|p| (*key, p))
        })
        .collect();
    positions.sort_by_key(|(_, p)| *p);

    let mut params = BTreeMap::new();
    for (i, (key, start)) in positions.iter().enumerate() {
        let end = positions
            .get(i + 1)
            .map(|(_, p)| *p)
            .unwrap_or(token.len());
        let from = (start + key.len()).min(end);
        params.insert(key.to_string(), token[from..end].replace('-', ""));
    }
    params
}

/// Java version facts from an image history, or `None` when nothing mentions Java
pub fn java_version_from_history(history: &[HistoryEntry]) -> Option<BTreeMap<String, String>> {
    let tokens = candidate_tokens(history);

    for token in &tokens {
        if let Some(idx) = token.find(JAVA_VERSION_ASSIGNMENT) {
            let value = token[idx + JAVA_VERSION_ASSIGNMENT.len()..]
                .split('=')
                .next()
                .unwrap_or_default();
            return Some(BTreeMap::from([("java".to_string(), numericalize(value))]));
        }
    }

    tokens
        .first()
        .map(|token| segment(token))
        .filter(|params| !params.is_empty())
}

/// Java version → tags, from tag → Java version
pub fn invert(tags: &BTreeMap<String, ConsolidatedEntry>) -> CompatibilityTable {
    let mut table = CompatibilityTable::new();
    for (tag, entry) in tags {
        if let Some(version) = entry.java_version() {
            table.insert(version, tag);
        }
    }
    table
}

/// Reads `<images_dir>/<family>/<tag>.json` inspect dumps. Directory names are
/// server families (`liberty`, `wildfly`); unknown directories and unreadable
/// dumps are skipped.
pub fn derive_from_dir(fs: &dyn FileSystem, images_dir: &Path) -> Result<DerivedImages, CatalogError> {
    if !fs.is_dir(images_dir) {
        return Err(CatalogError::MissingImagesDir(images_dir.to_path_buf()));
    }

    let mut derived = DerivedImages::default();
    let families = fs.read_dir(images_dir).map_err(|e| CatalogError::Read {
        path: images_dir.to_path_buf(),
        message: e.to_string(),
    })?;

    for family_dir in families.into_iter().filter(|e| e.is_dir()) {
        let Some(family) = ServerType::parse(family_dir.file_name()) else {
            warn!(dir = %family_dir.path().display(), "Skipping unknown image family");
            continue;
        };

        let entries = fs.read_dir(family_dir.path()).map_err(|e| CatalogError::Read {
            path: family_dir.path().to_path_buf(),
            message: e.to_string(),
        })?;

        for entry in entries {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(tag) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let inspect: ImageInspect = match fs
                .read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|c| serde_json::from_str(&c).map_err(|e| e.to_string()))
            {
                Ok(i) => i,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable image dump");
                    continue;
                }
            };

            let java = java_version_from_history(&inspect.history);
            debug!(family = %family, tag, java = ?java, "Introspected image");

            derived.consolidated.entry(family).or_default().insert(
                tag.to_string(),
                ConsolidatedEntry {
                    created: inspect.created.unwrap_or_default(),
                    java,
                },
            );
            if let Some(config) = inspect.config {
                derived.configs.insert(family, tag, config);
            }
        }
    }

    Ok(derived)
}
