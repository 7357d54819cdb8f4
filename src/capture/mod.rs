//! Categorized file lists produced by the project scan
//!
//! The scan itself happens elsewhere; this module only models its output and
//! loads it from a capture directory.

mod loader;

pub use loader::{CaptureLoader, GRADLE_DEPENDENCIES_FILE};

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

crate::define_id_enum! {
    /// Scan output category
    FileCategory {
        /// Any XML file
        AppConfig => "app_config_files" : "Application config files",
        ApplicationProperties => "application_properties_files" : "application.properties files",
        ApplicationYml => "application_yml_files" : "application.yml files",
        /// Any YAML file, deployment manifests included
        Yml => "yml_files" : "YAML files",
        GradleBuild => "gradle_build_automation_files" : "Gradle build files",
        MavenBuild => "maven_build_automation_files" : "Maven build files",
    }
}

crate::define_id_enum! {
    /// Coarse build tool tag
    BuildType {
        Undefined => "undefined" : "Undefined",
        Maven => "maven" : "Maven",
        Gradle => "gradle" : "Gradle",
    }
}

impl Default for BuildType {
    fn default() -> Self {
        BuildType::Undefined
    }
}

/// Result of the scan for one project. Read-only once built.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapturedData {
    files: BTreeMap<FileCategory, Vec<PathBuf>>,
    dependency_listing: Vec<String>,
    build_type: BuildType,
}

impl CapturedData {
    pub fn new(build_type: BuildType) -> Self {
        Self {
            build_type,
            ..Default::default()
        }
    }

    pub fn with_files<I, P>(mut self, category: FileCategory, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let entry = self.files.entry(category).or_default();
        entry.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_dependency_listing<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependency_listing
            .extend(lines.into_iter().map(Into::into));
        self
    }

    /// Files in a category, in scan order. Missing categories are empty.
    pub fn files(&self, category: FileCategory) -> &[PathBuf] {
        self.files
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn dependency_listing(&self) -> &[String] {
        &self.dependency_listing
    }

    pub fn build_type(&self) -> BuildType {
        self.build_type
    }

    /// The first captured `pom.xml`
    pub fn primary_maven_descriptor(&self) -> Option<&Path> {
        self.files(FileCategory::MavenBuild)
            .first()
            .map(PathBuf::as_path)
    }

    /// Whether a descriptor matching the build type was captured
    pub fn has_descriptor_for_build_type(&self) -> bool {
        match self.build_type {
            BuildType::Maven => !self.files(FileCategory::MavenBuild).is_empty(),
            BuildType::Gradle => !self.files(FileCategory::GradleBuild).is_empty(),
            BuildType::Undefined => true,
        }
    }
}
