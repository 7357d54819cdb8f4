use super::SegmentKind;
use crate::fs::FileSystem;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

const BUILTIN: &[(SegmentKind, &str)] = &[
    (
        SegmentKind::License,
        include_str!("../../templates/segments/dockerfile_license/Dockerfile"),
    ),
    (
        SegmentKind::MavenBuild,
        include_str!("../../templates/segments/dockerfile_maven_build/Dockerfile"),
    ),
    (
        SegmentKind::GradleBuild,
        include_str!("../../templates/segments/dockerfile_gradle_build/Dockerfile"),
    ),
    (
        SegmentKind::JbossRuntime,
        include_str!("../../templates/segments/dockerfile_jboss_runtime/Dockerfile"),
    ),
    (
        SegmentKind::OpenLibertyRuntime,
        include_str!("../../templates/segments/dockerfile_openliberty_runtime/Dockerfile"),
    ),
    (
        SegmentKind::SpringBootEmbeddedRuntime,
        include_str!("../../templates/segments/dockerfile_springboot_embedded_server_runtime/Dockerfile"),
    ),
    (
        SegmentKind::QuarkusEmbeddedRuntime,
        include_str!("../../templates/segments/dockerfile_quarkus_embedded_server_runtime/Dockerfile"),
    ),
];

/// Template text per segment kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTemplates {
    templates: BTreeMap<SegmentKind, String>,
}

impl Default for SegmentTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SegmentTemplates {
    pub fn builtin() -> Self {
        Self {
            templates: BUILTIN
                .iter()
                .map(|(kind, text)| (*kind, text.to_string()))
                .collect(),
        }
    }

    /// Built-in templates, replaced by `<dir>/<segment name>/Dockerfile` where present
    pub fn with_overrides(fs: &dyn FileSystem, dir: &Path) -> Self {
        let mut templates = Self::builtin();

        for kind in SegmentKind::all_variants() {
            let path = dir.join(kind.dir_name()).join("Dockerfile");
            if !fs.is_file(&path) {
                continue;
            }
            match fs.read_to_string(&path) {
                Ok(text) => {
                    debug!(segment = kind.dir_name(), path = %path.display(), "Template override");
                    templates.insert(*kind, text);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Keeping built-in template");
                }
            }
        }

        templates
    }

    pub fn insert(&mut self, kind: SegmentKind, text: impl Into<String>) {
        self.templates.insert(kind, text.into());
    }

    pub fn remove(&mut self, kind: SegmentKind) {
        self.templates.remove(&kind);
    }

    pub fn get(&self, kind: SegmentKind) -> Option<&str> {
        self.templates.get(&kind).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn test_every_kind_has_builtin_template() {
        let templates = SegmentTemplates::builtin();
        for kind in SegmentKind::all_variants() {
            let text = templates.get(*kind).unwrap();
            assert!(!text.trim().is_empty(), "{} is empty", kind);
        }
    }

    #[test]
    fn test_directory_override() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/mock/templates/dockerfile_license/Dockerfile",
            "# internal license\n",
        );

        let templates = SegmentTemplates::with_overrides(&fs, Path::new("/mock/templates"));
        assert_eq!(templates.get(SegmentKind::License), Some("# internal license\n"));
        assert_eq!(
            templates.get(SegmentKind::MavenBuild),
            SegmentTemplates::builtin().get(SegmentKind::MavenBuild)
        );
    }
}
