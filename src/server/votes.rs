//! Pluggable scoring functions for server detection

use super::{ServerType, VoteTally};
use crate::capture::{BuildType, CapturedData, FileCategory};
use crate::diagnostics::{Diagnostics, Stage};
use crate::fs::FileSystem;
use crate::maven::PomDocument;
use std::path::Path;
use tracing::debug;

const TREE_CONNECTOR: &str = "\\---";

/// Inputs shared by every vote source for one project
pub struct VoteContext<'a> {
    pub fs: &'a dyn FileSystem,
    pub app_path: &'a Path,
    pub captured: &'a CapturedData,
}

pub trait VoteSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn vote(&self, ctx: &VoteContext<'_>, diagnostics: &mut Diagnostics) -> VoteTally;

    /// Server version, when this source can tell
    fn version_hint(&self, _ctx: &VoteContext<'_>) -> Option<String> {
        None
    }
}

/// One point per directory under `<app>/src` whose relative path names a server
pub struct FolderStructureVote;

impl VoteSource for FolderStructureVote {
    fn name(&self) -> &'static str {
        "folder_structure"
    }

    fn vote(&self, ctx: &VoteContext<'_>, _diagnostics: &mut Diagnostics) -> VoteTally {
        let mut tally = VoteTally::new();

        for dir in ctx.fs.walk_dirs(&ctx.app_path.join("src")) {
            let relative = dir.strip_prefix(ctx.app_path).unwrap_or(&dir);
            let relative = relative.to_string_lossy();
            for server in ServerType::IDENTITIES {
                if relative.contains(server.vote_token()) {
                    tally.add(server, 1);
                }
            }
        }

        tally
    }
}

/// Per Maven descriptor, at most one point per identity for each of the
/// dependencies, build plugins and properties blocks
pub struct DescriptorVote;

impl DescriptorVote {
    fn score(pom: &PomDocument) -> VoteTally {
        let categories: [Vec<&str>; 3] = [
            pom.dependencies.iter().map(|d| d.source.as_str()).collect(),
            pom.plugins.iter().map(|p| p.source.as_str()).collect(),
            pom.properties.iter().map(|p| p.source.as_str()).collect(),
        ];

        let mut tally = VoteTally::new();
        for blocks in &categories {
            for server in ServerType::IDENTITIES {
                if blocks.iter().any(|b| b.contains(server.vote_token())) {
                    tally.add(server, 1);
                }
            }
        }
        tally
    }
}

impl VoteSource for DescriptorVote {
    fn name(&self) -> &'static str {
        "build_descriptor"
    }

    fn vote(&self, ctx: &VoteContext<'_>, diagnostics: &mut Diagnostics) -> VoteTally {
        let mut tally = VoteTally::new();

        for path in ctx.captured.files(FileCategory::MavenBuild) {
            match PomDocument::load(ctx.fs, path) {
                Ok(pom) => tally.merge(&Self::score(&pom)),
                Err(e) => diagnostics.warn(
                    Stage::Server,
                    format!("Descriptor {} not counted: {}", path.display(), e),
                ),
            }
        }

        tally
    }
}

/// One point per identity named anywhere in the Gradle dependency dump
pub struct DependencyListingVote;

impl VoteSource for DependencyListingVote {
    fn name(&self) -> &'static str {
        "dependency_listing"
    }

    fn vote(&self, ctx: &VoteContext<'_>, _diagnostics: &mut Diagnostics) -> VoteTally {
        let mut tally = VoteTally::new();
        if ctx.captured.build_type() != BuildType::Gradle {
            return tally;
        }

        let listing = ctx.captured.dependency_listing();
        for server in ServerType::IDENTITIES {
            if listing.iter().any(|line| line.contains(server.vote_token())) {
                tally.add(server, 1);
            }
        }
        tally
    }

    /// Liberty version from the last liberty line using the `\---` connector
    /// that carries one
    fn version_hint(&self, ctx: &VoteContext<'_>) -> Option<String> {
        if ctx.captured.build_type() != BuildType::Gradle {
            return None;
        }

        let version = ctx
            .captured
            .dependency_listing()
            .iter()
            .filter(|line| line.contains(ServerType::Liberty.vote_token()))
            .filter(|line| line.contains(TREE_CONNECTOR))
            .filter_map(|line| listed_version(line))
            .last();

        if let Some(v) = &version {
            debug!(version = %v, "Liberty version from dependency listing");
        }
        version
    }
}

/// Version of one dependency tree line: the resolved side of `->` when present,
/// otherwise the last coordinate segment. Tree drawing and `(*)` style markers
/// are ignored.
fn listed_version(line: &str) -> Option<String> {
    let entry = line.trim_start_matches(|c: char| matches!(c, '|' | '+' | '\\' | '-' | ' '));
    let entry = entry.split(" (").next().unwrap_or(entry).trim();

    let version = match entry.rsplit_once("->") {
        Some((_, resolved)) => resolved.trim(),
        None => entry.rsplit_once(':').map(|(_, v)| v.trim())?,
    };
    (!version.is_empty()).then(|| version.to_string())
}
