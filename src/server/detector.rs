use super::votes::{DependencyListingVote, DescriptorVote, FolderStructureVote, VoteContext, VoteSource};
use super::{ServerDetectionResult, ServerType, VoteTally};
use crate::diagnostics::{Diagnostics, Stage};
use crate::metadata::Packaging;
use tracing::{debug, info};

/// Sums the votes of every source and decides between embedded and external servers
pub struct ServerDetector {
    sources: Vec<Box<dyn VoteSource>>,
}

impl ServerDetector {
    pub fn new(sources: Vec<Box<dyn VoteSource>>) -> Self {
        Self { sources }
    }

    pub fn with_defaults() -> Self {
        Self::new(vec![
            Box::new(FolderStructureVote),
            Box::new(DescriptorVote),
            Box::new(DependencyListingVote),
        ])
    }

    pub fn detect(
        &self,
        ctx: &VoteContext<'_>,
        framework_detected: bool,
        packaging: &Packaging,
        diagnostics: &mut Diagnostics,
    ) -> ServerDetectionResult {
        let mut tally = VoteTally::new();
        for source in &self.sources {
            let votes = source.vote(ctx, diagnostics);
            debug!(source = source.name(), votes = ?votes, "Server votes");
            tally.merge(&votes);
        }

        let server_type = tally.winner();
        if tally.is_tie() {
            diagnostics.warn(
                Stage::Server,
                format!(
                    "Server vote tied (tomcat={}, jboss={}, liberty={}); leaving server undefined",
                    tally.get(ServerType::Tomcat),
                    tally.get(ServerType::Jboss),
                    tally.get(ServerType::Liberty),
                ),
            );
        }

        // Embedded only when the framework brings its own Tomcat and the app is not a war
        let is_embedded = framework_detected
            && matches!(server_type, ServerType::Undefined | ServerType::Tomcat)
            && !packaging.is_war();

        let version = self.sources.iter().find_map(|s| s.version_hint(ctx));

        info!(
            server = %server_type,
            embedded = is_embedded,
            total_votes = tally.total(),
            "Server detection complete"
        );

        ServerDetectionResult {
            server_type,
            is_embedded,
            version,
            tally,
        }
    }
}

impl Default for ServerDetector {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{BuildType, CapturedData, FileCategory};
    use crate::fs::MockFileSystem;
    use std::path::Path;

    struct FixedVote(ServerType, u32);

    impl VoteSource for FixedVote {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn vote(&self, _ctx: &VoteContext<'_>, _diagnostics: &mut Diagnostics) -> VoteTally {
            let mut tally = VoteTally::new();
            tally.add(self.0, self.1);
            tally
        }
    }

    fn detect_with(
        sources: Vec<Box<dyn VoteSource>>,
        framework_detected: bool,
        packaging: &str,
    ) -> (ServerDetectionResult, Diagnostics) {
        let fs = MockFileSystem::new();
        let captured = CapturedData::default();
        let ctx = VoteContext {
            fs: &fs,
            app_path: Path::new("/mock/app"),
            captured: &captured,
        };
        let packaging = Packaging {
            packaging: packaging.to_string(),
            parent_pom_packaging: None,
        };
        let mut diags = Diagnostics::new();
        let result = ServerDetector::new(sources).detect(&ctx, framework_detected, &packaging, &mut diags);
        (result, diags)
    }

    #[test]
    fn test_votes_are_summed_across_sources() {
        let (result, diags) = detect_with(
            vec![
                Box::new(FixedVote(ServerType::Jboss, 2)),
                Box::new(FixedVote(ServerType::Liberty, 1)),
                Box::new(FixedVote(ServerType::Jboss, 1)),
            ],
            false,
            "",
        );
        assert_eq!(result.server_type, ServerType::Jboss);
        assert_eq!(result.tally.get(ServerType::Jboss), 3);
        assert!(!result.is_embedded);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_tie_is_undefined_with_diagnostic() {
        let (result, diags) = detect_with(
            vec![
                Box::new(FixedVote(ServerType::Tomcat, 2)),
                Box::new(FixedVote(ServerType::Liberty, 2)),
            ],
            false,
            "",
        );
        assert_eq!(result.server_type, ServerType::Undefined);
        assert_eq!(diags.for_stage(Stage::Server).count(), 1);
    }

    #[test]
    fn test_framework_with_tomcat_is_embedded() {
        let (result, _) = detect_with(vec![Box::new(FixedVote(ServerType::Tomcat, 1))], true, "jar");
        assert!(result.is_embedded);

        let (result, _) = detect_with(vec![], true, "");
        assert!(result.is_embedded);
    }

    #[test]
    fn test_war_packaging_is_never_embedded() {
        let (result, _) = detect_with(vec![Box::new(FixedVote(ServerType::Tomcat, 1))], true, "war");
        assert!(!result.is_embedded);
    }

    #[test]
    fn test_framework_with_liberty_is_external() {
        let (result, _) = detect_with(vec![Box::new(FixedVote(ServerType::Liberty, 4))], true, "");
        assert!(!result.is_embedded);
        assert_eq!(result.server_type, ServerType::Liberty);
    }

    #[test]
    fn test_default_sources_on_gradle_project() {
        let fs = MockFileSystem::new();
        fs.add_dir("/mock/app/src/main/liberty/config");
        let captured = CapturedData::new(BuildType::Gradle)
            .with_files(FileCategory::GradleBuild, ["/mock/app/build.gradle"])
            .with_dependency_listing(["\\--- io.openliberty:openliberty-runtime:22.0.0.1"]);
        let ctx = VoteContext {
            fs: &fs,
            app_path: Path::new("/mock/app"),
            captured: &captured,
        };
        let mut diags = Diagnostics::new();

        let result = ServerDetector::with_defaults().detect(&ctx, false, &Packaging::default(), &mut diags);
        assert_eq!(result.server_type, ServerType::Liberty);
        assert_eq!(result.tally.get(ServerType::Liberty), 3);
        assert_eq!(
            result.version.as_deref(),
            Some("22.0.0.1")
        );
    }
}
