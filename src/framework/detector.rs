use super::{DetectionMethod, Framework, FrameworkRegistry, FrameworkResult};
use crate::capture::{CapturedData, FileCategory};
use crate::diagnostics::{Diagnostics, Stage};
use crate::fs::FileSystem;
use crate::maven::PomDocument;
use tracing::debug;

/// Rule-first framework detection.
///
/// A framework matches when the primary `pom.xml` or any Gradle build file
/// declares one of its starters. Only when no starter matched at all does a
/// captured config file of a framework count as a match.
pub struct FrameworkDetector<'a> {
    registry: &'a FrameworkRegistry,
    fs: &'a dyn FileSystem,
}

/// Build inputs the rules look at, read once per detection
struct DeclaredDependencies {
    maven_coordinates: Vec<String>,
    gradle_lines: Vec<String>,
}

impl<'a> FrameworkDetector<'a> {
    pub fn new(registry: &'a FrameworkRegistry, fs: &'a dyn FileSystem) -> Self {
        Self { registry, fs }
    }

    pub fn detect(&self, captured: &CapturedData, diagnostics: &mut Diagnostics) -> FrameworkResult {
        let declared = self.declared_dependencies(captured, diagnostics);

        let by_starter: Vec<_> = self
            .registry
            .frameworks()
            .iter()
            .map(|fw| (fw.id(), matches_starter(fw.as_ref(), &declared)))
            .collect();

        if by_starter.iter().any(|(_, d)| *d) {
            debug!(detections = ?by_starter, "Framework starter rule fired");
            return FrameworkResult::new(by_starter, DetectionMethod::Rule);
        }

        // Config files only count when no framework declared a starter
        let by_config: Vec<_> = self
            .registry
            .frameworks()
            .iter()
            .map(|fw| (fw.id(), matches_config_file(fw.as_ref(), captured)))
            .collect();

        if by_config.iter().any(|(_, d)| *d) {
            debug!(detections = ?by_config, "Framework config file rule fired");
            return FrameworkResult::new(by_config, DetectionMethod::Rule);
        }

        debug!("No framework rule fired, falling back to heuristic");
        FrameworkResult::new(
            self.registry
                .frameworks()
                .iter()
                .map(|fw| (fw.id(), false))
                .collect(),
            DetectionMethod::Heuristic,
        )
    }

    fn declared_dependencies(
        &self,
        captured: &CapturedData,
        diagnostics: &mut Diagnostics,
    ) -> DeclaredDependencies {
        let maven_coordinates = match captured.primary_maven_descriptor() {
            Some(path) => match PomDocument::load(self.fs, path) {
                Ok(pom) => pom.dependencies.iter().map(|d| d.coordinates()).collect(),
                Err(e) => {
                    diagnostics.warn(
                        Stage::Framework,
                        format!("Skipping unreadable descriptor {}: {}", path.display(), e),
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let mut gradle_lines = Vec::new();
        for path in captured.files(FileCategory::GradleBuild) {
            match self.fs.read_to_string(path) {
                Ok(content) => gradle_lines.extend(content.lines().map(str::to_string)),
                Err(e) => diagnostics.warn(
                    Stage::Framework,
                    format!("Skipping unreadable build file {}: {}", path.display(), e),
                ),
            }
        }

        DeclaredDependencies {
            maven_coordinates,
            gradle_lines,
        }
    }
}

fn matches_starter(framework: &dyn Framework, declared: &DeclaredDependencies) -> bool {
    let patterns = framework.dependency_patterns();
    declared
        .maven_coordinates
        .iter()
        .chain(declared.gradle_lines.iter())
        .any(|candidate| patterns.iter().any(|p| p.matches(candidate)))
}

fn matches_config_file(framework: &dyn Framework, captured: &CapturedData) -> bool {
    let names = framework.config_files();
    if names.is_empty() {
        return false;
    }

    FileCategory::all_variants()
        .iter()
        .flat_map(|category| captured.files(*category))
        .filter_map(|path| path.file_name())
        .any(|name| names.iter().any(|n| name == *n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::BuildType;
    use crate::framework::{FrameworkId, FrameworkKey};
    use crate::fs::MockFileSystem;

    fn detect(fs: &MockFileSystem, captured: &CapturedData) -> (FrameworkResult, Diagnostics) {
        let registry = FrameworkRegistry::with_defaults();
        let mut diags = Diagnostics::new();
        let result = FrameworkDetector::new(&registry, fs).detect(captured, &mut diags);
        (result, diags)
    }

    #[test]
    fn test_spring_boot_from_starter() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/mock/app/pom.xml",
            "<project><dependencies><dependency><groupId>org.springframework.boot</groupId><artifactId>spring-boot-starter-web</artifactId></dependency></dependencies></project>",
        );
        let captured = CapturedData::new(BuildType::Maven)
            .with_files(FileCategory::MavenBuild, ["/mock/app/pom.xml"]);

        let (result, _) = detect(&fs, &captured);
        assert_eq!(result.detected(), Some(FrameworkId::SpringBoot));
        assert_eq!(result.method(), DetectionMethod::Rule);
    }

    #[test]
    fn test_spring_boot_from_config_file_only() {
        let fs = MockFileSystem::new();
        let captured = CapturedData::new(BuildType::Undefined).with_files(
            FileCategory::ApplicationProperties,
            ["/mock/app/src/main/resources/application.properties"],
        );

        let (result, _) = detect(&fs, &captured);
        assert!(result.is_detected(FrameworkId::SpringBoot));
        assert!(!result.is_detected(FrameworkId::Quarkus));
    }

    #[test]
    fn test_quarkus_from_gradle() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/mock/app/build.gradle",
            "dependencies {\n    implementation 'io.quarkus:quarkus-resteasy'\n}\n",
        );
        let captured = CapturedData::new(BuildType::Gradle)
            .with_files(FileCategory::GradleBuild, ["/mock/app/build.gradle"]);

        let (result, _) = detect(&fs, &captured);
        assert_eq!(result.detected(), Some(FrameworkId::Quarkus));
    }

    #[test]
    fn test_quarkus_starter_outranks_spring_config_file() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/mock/app/pom.xml",
            "<project><dependencies><dependency><groupId>io.quarkus</groupId><artifactId>quarkus-resteasy</artifactId></dependency></dependencies></project>",
        );
        let captured = CapturedData::new(BuildType::Maven)
            .with_files(FileCategory::MavenBuild, ["/mock/app/pom.xml"])
            .with_files(
                FileCategory::ApplicationProperties,
                ["/mock/app/src/main/resources/application.properties"],
            );

        let (result, _) = detect(&fs, &captured);
        assert_eq!(result.detected(), Some(FrameworkId::Quarkus));
        assert!(!result.is_detected(FrameworkId::SpringBoot));
        assert_eq!(result.method(), DetectionMethod::Rule);
    }

    #[test]
    fn test_heuristic_when_no_rule_fires() {
        let fs = MockFileSystem::new();
        fs.add_file("/mock/app/pom.xml", "<project><artifactId>plain</artifactId></project>");
        let captured = CapturedData::new(BuildType::Maven)
            .with_files(FileCategory::MavenBuild, ["/mock/app/pom.xml"]);

        let (result, diags) = detect(&fs, &captured);
        assert_eq!(result.method(), DetectionMethod::Heuristic);
        assert_eq!(result.key(), FrameworkKey::Undefined);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unreadable_descriptor_recorded() {
        let fs = MockFileSystem::new();
        let captured = CapturedData::new(BuildType::Maven)
            .with_files(FileCategory::MavenBuild, ["/mock/missing/pom.xml"]);

        let (result, diags) = detect(&fs, &captured);
        assert_eq!(result.detected(), None);
        assert_eq!(diags.for_stage(Stage::Framework).count(), 1);
    }
}
