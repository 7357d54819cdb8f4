//! Immutable lookup tables: Java version → image, plus image metadata
//!
//! A [`Catalog`] is built once (built-in defaults, optionally replaced from a
//! JSON file and refreshed from a consolidated image dump) and then shared
//! read-only by every project run.

mod images;
pub mod introspect;
mod tables;

pub use images::{ImageConfig, ImageMetadataCatalog};
pub use introspect::{ConsolidatedEntry, ConsolidatedImages};
pub use tables::CompatibilityTable;

use crate::fs::FileSystem;
use crate::server::ServerType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const LIBERTY_DEFAULT: &str = "LIBERTY_DEFAULT";
pub const JBOSS_DEFAULT: &str = "JBOSS_DEFAULT";
pub const TOMCAT_DEFAULT: &str = "TOMCAT_DEFAULT";
pub const JAVA_DEFAULT: &str = "JAVA_DEFAULT";

const LIBERTY_REPOSITORY: &str = "openliberty/open-liberty";
const WILDFLY_REPOSITORY: &str = "jboss/wildfly";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path:?}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Images directory {0:?} does not exist")]
    MissingImagesDir(PathBuf),
}

/// Read-only configuration shared by every project run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Java version → build image tag used by the build segments
    pub build_images: BTreeMap<String, String>,
    /// Java version → JRE image used by embedded-server runtimes
    pub runtime_images: BTreeMap<String, String>,
    pub liberty: CompatibilityTable,
    pub wildfly: CompatibilityTable,
    pub images: ImageMetadataCatalog,
    pub jboss_deployment_paths: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Tables shipped with segbox
    pub fn builtin() -> Self {
        let build_images = [
            ("1.8", "8"),
            ("1.8.0", "8"),
            ("8", "8"),
            ("11", "11"),
            ("17", "17"),
            ("21", "21"),
        ];
        let runtime_images = [
            ("1.8", "eclipse-temurin:8-jre"),
            ("1.8.0", "eclipse-temurin:8-jre"),
            ("8", "eclipse-temurin:8-jre"),
            ("11", "eclipse-temurin:11-jre"),
            ("17", "eclipse-temurin:17-jre"),
            ("21", "eclipse-temurin:21-jre"),
        ];

        let java8_liberty: &[&str] = &["full-java8-openj9-ubi", "kernel-slim-java8-openj9-ubi"];
        let java11_liberty: &[&str] = &["full-java11-openj9-ubi", "kernel-slim-java11-openj9-ubi"];
        let java17_liberty: &[&str] = &["full-java17-openj9-ubi", "kernel-slim-java17-openj9-ubi"];
        let java21_liberty: &[&str] = &["full-java21-openj9-ubi", "kernel-slim-java21-openj9-ubi"];
        let liberty = CompatibilityTable::from_entries([
            ("1.8", java8_liberty),
            ("1.8.0", &["full-java8-openj9-ubi"][..]),
            ("8", java8_liberty),
            ("11", java11_liberty),
            ("17", java17_liberty),
            ("21", java21_liberty),
        ]);

        let java8_wildfly: &[&str] = &["18.0.1.Final", "20.0.1.Final", "21.0.2.Final"];
        let wildfly = CompatibilityTable::from_entries([
            ("1.8", java8_wildfly),
            ("8", java8_wildfly),
            ("11", &["23.0.2.Final", "24.0.0.Final", "25.0.1.Final"][..]),
            ("17", &["26.1.3.Final-jdk17", "27.0.1.Final-jdk17"][..]),
            ("21", &["30.0.0.Final-jdk21"][..]),
        ]);

        let mut images = ImageMetadataCatalog::new();
        for tags in [java8_liberty, java11_liberty, java17_liberty, java21_liberty] {
            for tag in tags {
                images.insert(ServerType::Liberty, tag, liberty_image_config());
            }
        }
        for version in wildfly.versions() {
            for tag in wildfly.candidates(version).into_iter().flatten() {
                images.insert(ServerType::Jboss, tag, wildfly_image_config());
            }
        }

        Self {
            build_images: to_map(&build_images),
            runtime_images: to_map(&runtime_images),
            liberty,
            wildfly,
            images,
            jboss_deployment_paths: vec!["/opt/jboss/wildfly/standalone/deployments/".to_string()],
        }
    }

    /// Parses a catalog document; sections it omits keep their built-in values
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, CatalogError> {
        let content = fs.read_to_string(path).map_err(|e| CatalogError::Read {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })?;
        let catalog = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            images = catalog.images.len(),
            "Loaded image catalog"
        );
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuilds the liberty and wildfly tables by inverting a consolidated
    /// tag → Java version dump. Families missing from the dump keep their table.
    pub fn with_consolidated(mut self, consolidated: &ConsolidatedImages) -> Self {
        for (family, tags) in consolidated {
            let table = introspect::invert(tags);
            debug!(family = %family, versions = table.versions().count(), "Derived compatibility table");
            match family {
                ServerType::Liberty => self.liberty = table,
                ServerType::Jboss => self.wildfly = table,
                _ => {}
            }
        }
        self
    }

    pub fn build_image(&self, java_version: &str) -> Option<&str> {
        self.build_images.get(java_version).map(String::as_str)
    }

    pub fn runtime_image(&self, java_version: &str) -> Option<&str> {
        self.runtime_images.get(java_version).map(String::as_str)
    }

    pub fn jboss_deployment_path(&self) -> Option<&str> {
        self.jboss_deployment_paths.first().map(String::as_str)
    }

    /// Full image reference for a tag; `<TYPE>_DEFAULT` sentinels pass through
    pub fn image_reference(family: ServerType, tag: &str) -> String {
        if tag.ends_with("_DEFAULT") {
            return tag.to_string();
        }
        match family {
            ServerType::Liberty => format!("{}:{}", LIBERTY_REPOSITORY, tag),
            ServerType::Jboss => format!("{}:{}", WILDFLY_REPOSITORY, tag),
            _ => tag.to_string(),
        }
    }
}

fn to_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn exposing(ports: &[&str], user: &str) -> ImageConfig {
    ImageConfig {
        exposed_ports: ports
            .iter()
            .map(|p| (p.to_string(), serde_json::json!({})))
            .collect(),
        user: Some(user.to_string()),
        env: Vec::new(),
    }
}

fn liberty_image_config() -> ImageConfig {
    exposing(&["9080/tcp", "9443/tcp"], "1001")
}

fn wildfly_image_config() -> ImageConfig {
    exposing(&["8080/tcp"], "jboss")
}
