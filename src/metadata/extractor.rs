use super::{ConfigServerAvailability, HierarchyInfo, Metadata, Packaging, BASELINE_JAVA_VERSION};
use crate::capture::CapturedData;
use crate::diagnostics::{Diagnostics, Stage};
use crate::fs::FileSystem;
use crate::maven::PomDocument;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_SERVER_ARTIFACT: &str = "spring-cloud-config-server";

/// `<relativePath>` values that point at the directory above the project
const PARENT_DIR_RELATIVE_PATHS: &[&str] = &["", "../", "..", "../pom.xml"];

/// Reads version, hierarchy, packaging and config-server facts from the
/// project's primary `pom.xml` and its parent. Never fails: anything that
/// cannot be read degrades to defaults plus a diagnostic.
pub struct MetadataExtractor<'a> {
    fs: &'a dyn FileSystem,
    app_path: &'a Path,
    basename: &'a str,
}

impl<'a> MetadataExtractor<'a> {
    pub fn new(fs: &'a dyn FileSystem, app_path: &'a Path, basename: &'a str) -> Self {
        Self {
            fs,
            app_path,
            basename,
        }
    }

    pub fn extract(&self, captured: &CapturedData, diagnostics: &mut Diagnostics) -> Metadata {
        let Some(pom_path) = captured.primary_maven_descriptor() else {
            debug!("No Maven descriptor captured, using default metadata");
            return Metadata::default();
        };

        let pom = match PomDocument::load(self.fs, pom_path) {
            Ok(pom) => pom,
            Err(e) => {
                diagnostics.warn(
                    Stage::Metadata,
                    format!("Cannot parse primary descriptor {}: {}", pom_path.display(), e),
                );
                return Metadata::default();
            }
        };

        let parent = self.resolve_parent(&pom, diagnostics);
        let hierarchy_info = match &parent {
            Some((path, _)) => HierarchyInfo::module_of(path.clone()),
            None => HierarchyInfo::standalone(),
        };

        let packaging = Packaging {
            packaging: pom.packaging.clone().unwrap_or_default(),
            parent_pom_packaging: parent.as_ref().map(|(_, p)| p.packaging.clone()),
        };

        let config_server_availability = match &parent {
            Some((_, parent_pom)) => self.find_config_server(parent_pom, diagnostics),
            None => ConfigServerAvailability::default(),
        };

        Metadata {
            artifacts_versions: artifacts_versions(&pom),
            hierarchy_info,
            packaging,
            config_server_availability,
            plugins: pom.plugins.clone(),
            description: pom.description.clone(),
        }
    }

    fn parent_dir(&self) -> PathBuf {
        self.app_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// The parent descriptor, when this project is one of its listed modules
    fn resolve_parent(
        &self,
        pom: &PomDocument,
        diagnostics: &mut Diagnostics,
    ) -> Option<(PathBuf, PomDocument)> {
        let parent = pom.parent.as_ref()?;

        let relative = parent.relative_path.as_deref().unwrap_or_default().trim();
        if !PARENT_DIR_RELATIVE_PATHS.contains(&relative) {
            diagnostics.warn(
                Stage::Metadata,
                format!("Unsupported parent relativePath '{}', treating project as standalone", relative),
            );
            return None;
        }

        let parent_path = self.parent_dir().join("pom.xml");
        if !self.fs.is_file(&parent_path) {
            debug!(path = %parent_path.display(), "No parent descriptor next to project");
            return None;
        }

        let parent_pom = match PomDocument::load(self.fs, &parent_path) {
            Ok(p) => p,
            Err(e) => {
                diagnostics.warn(
                    Stage::Metadata,
                    format!("Cannot parse parent descriptor {}: {}", parent_path.display(), e),
                );
                return None;
            }
        };

        if parent_pom.modules.iter().any(|m| m == self.basename) {
            debug!(parent = %parent_path.display(), module = self.basename, "Project is a module");
            Some((parent_path, parent_pom))
        } else {
            None
        }
    }

    /// Scans sibling modules for a Spring Cloud Config Server dependency.
    /// The last matching module wins.
    fn find_config_server(
        &self,
        parent_pom: &PomDocument,
        diagnostics: &mut Diagnostics,
    ) -> ConfigServerAvailability {
        let mut result = ConfigServerAvailability::default();
        let parent_dir = self.parent_dir();

        for module in &parent_pom.modules {
            let candidate = parent_dir.join(module).join("pom.xml");
            if !self.fs.is_file(&candidate) {
                continue;
            }

            let module_pom = match PomDocument::load(self.fs, &candidate) {
                Ok(p) => p,
                Err(e) => {
                    diagnostics.warn(
                        Stage::Metadata,
                        format!("Cannot parse module descriptor {}: {}", candidate.display(), e),
                    );
                    continue;
                }
            };

            if module_pom.has_dependency_artifact(CONFIG_SERVER_ARTIFACT) {
                debug!(module = %module, "Found config server module");
                result = ConfigServerAvailability {
                    is_config_server_available: true,
                    is_this_module_config_server: Some(module == self.basename),
                    name: Some(module.clone()),
                    path: Some(candidate),
                };
            }
        }

        result
    }
}

/// Every property whose name contains `.version`, with `java.version`
/// back-filled from the compiler settings or the baseline
fn artifacts_versions(pom: &PomDocument) -> BTreeMap<String, String> {
    let mut versions: BTreeMap<String, String> = pom
        .properties
        .iter()
        .filter(|p| p.name.contains(".version"))
        .map(|p| (p.name.clone(), p.value.clone()))
        .collect();

    if !versions.contains_key("java.version") {
        let java = pom
            .compiler_java_version()
            .unwrap_or(BASELINE_JAVA_VERSION)
            .to_string();
        versions.insert("java.version".to_string(), java);
    }

    versions
}
