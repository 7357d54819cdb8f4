//! Project facts read from the Maven descriptor hierarchy

mod extractor;

pub use extractor::MetadataExtractor;

use crate::maven::PomPlugin;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Java level assumed when the descriptor declares none
pub const BASELINE_JAVA_VERSION: &str = "1.8";

/// Whether the project is a module of a parent aggregator.
///
/// `parent_pom` is set exactly when `is_module` is true; the fields are
/// private so the two cannot drift apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchyInfo {
    is_module: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_pom: Option<PathBuf>,
}

impl HierarchyInfo {
    pub fn standalone() -> Self {
        Self::default()
    }

    pub fn module_of(parent_pom: PathBuf) -> Self {
        Self {
            is_module: true,
            parent_pom: Some(parent_pom),
        }
    }

    pub fn is_module(&self) -> bool {
        self.is_module
    }

    pub fn parent_pom(&self) -> Option<&Path> {
        self.parent_pom.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Packaging {
    /// `<packaging>` text, `""` when absent
    pub packaging: String,
    /// Only filled for modules; `None` inside when the parent has no element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_pom_packaging: Option<Option<String>>,
}

impl Packaging {
    pub fn is_war(&self) -> bool {
        self.packaging.eq_ignore_ascii_case("war")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigServerAvailability {
    pub is_config_server_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_this_module_config_server: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub artifacts_versions: BTreeMap<String, String>,
    pub hierarchy_info: HierarchyInfo,
    pub packaging: Packaging,
    pub config_server_availability: ConfigServerAvailability,
    pub plugins: Vec<PomPlugin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Metadata {
    /// `java.version`, or the 1.8 baseline
    pub fn java_version(&self) -> &str {
        self.artifacts_versions
            .get("java.version")
            .map(String::as_str)
            .unwrap_or(BASELINE_JAVA_VERSION)
    }
}
