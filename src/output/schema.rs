//! Segment document schema
//!
//! The document handed to downstream tooling: the ordered segment list with
//! its parameters, the project metadata it was derived from and any platform
//! manifest overrides.

use crate::manifest::PlatformParams;
use crate::metadata::Metadata;
use crate::segments::{SegmentKind, SegmentList};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;

pub const DOCUMENT_TYPE: &str = "segments";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentDocument {
    #[serde(rename = "type")]
    pub document_type: String,
    pub segments: SegmentList,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "PlatformParams::is_empty")]
    pub platform: PlatformParams,
}

impl SegmentDocument {
    pub fn new(segments: SegmentList, metadata: Metadata, platform: PlatformParams) -> Self {
        Self {
            document_type: DOCUMENT_TYPE.to_string(),
            segments,
            metadata,
            platform,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize segment document to JSON")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize segment document to YAML")
    }

    /// Checks the segment list shape: license, one build segment, at most one runtime segment
    pub fn validate(&self) -> Result<()> {
        if self.document_type != DOCUMENT_TYPE {
            anyhow::bail!(
                "Document type must be '{}', got '{}'",
                DOCUMENT_TYPE,
                self.document_type
            );
        }

        let kinds = self.segments.kinds();
        match kinds.first() {
            Some(SegmentKind::License) => {}
            Some(other) => anyhow::bail!("First segment must be the license, got {}", other),
            None => anyhow::bail!("Segment list cannot be empty"),
        }

        match kinds.get(1) {
            Some(SegmentKind::MavenBuild | SegmentKind::GradleBuild) => {}
            Some(other) => anyhow::bail!("Second segment must be a build segment, got {}", other),
            None => anyhow::bail!("Segment list has no build segment"),
        }

        let rest = &kinds[2..];
        if rest.len() > 1 {
            anyhow::bail!(
                "At most one runtime segment is allowed, got {}",
                rest.len()
            );
        }
        if let Some(kind) = rest.first() {
            if !kind.is_runtime() {
                anyhow::bail!("Third segment must be a runtime segment, got {}", kind);
            }
        }

        Ok(())
    }
}

impl fmt::Display for SegmentDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Segments ({}):", self.segments.len())?;
        for segment in self.segments.iter() {
            writeln!(f, "  - {}", segment.segment_id.dir_name())?;
        }

        writeln!(f, "Java version: {}", self.metadata.java_version())?;
        if !self.metadata.packaging.packaging.is_empty() {
            writeln!(f, "Packaging: {}", self.metadata.packaging.packaging)?;
        }
        if self.metadata.hierarchy_info.is_module() {
            if let Some(parent) = self.metadata.hierarchy_info.parent_pom() {
                writeln!(f, "Parent POM: {}", parent.display())?;
            }
        }

        let apps: Vec<_> = self.platform.applications().collect();
        if !apps.is_empty() {
            writeln!(f, "Platform applications:")?;
            for app in apps {
                write!(f, "  - {}", app.name)?;
                if !app.memory.is_empty() {
                    write!(f, " (memory {})", app.memory)?;
                }
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::capture::BuildType;
    use crate::framework::FrameworkRegistry;
    use crate::segments::SegmentIntegrator;

    fn segments() -> SegmentList {
        let catalog = Catalog::builtin();
        let registry = FrameworkRegistry::with_defaults();
        let mut integrator = SegmentIntegrator::new(&catalog, &registry);
        integrator.add_license().unwrap();
        integrator
            .add_build_segment(BuildType::Maven, "shop", "11")
            .unwrap();
        integrator.into_segments()
    }

    #[test]
    fn test_valid_document() {
        let doc = SegmentDocument::new(segments(), Metadata::default(), PlatformParams::default());
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_to_json_shape() {
        let doc = SegmentDocument::new(segments(), Metadata::default(), PlatformParams::default());
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(json["type"], "segments");
        assert_eq!(
            json["segments"][0]["segment_id"],
            "segments/dockerfile_license/Dockerfile"
        );
        assert_eq!(json["segments"][1]["app_name"], "shop");
        assert!(json.get("platform").is_none());
    }

    #[test]
    fn test_to_yaml() {
        let doc = SegmentDocument::new(segments(), Metadata::default(), PlatformParams::default());
        let yaml = doc.to_yaml().unwrap();
        assert!(yaml.contains("type: segments"));
        assert!(yaml.contains("dockerfile_maven_build"));
    }

    #[test]
    fn test_empty_segments_invalid() {
        let doc = SegmentDocument::new(
            SegmentList::new(),
            Metadata::default(),
            PlatformParams::default(),
        );
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_wrong_type_invalid() {
        let mut doc = SegmentDocument::new(segments(), Metadata::default(), PlatformParams::default());
        doc.document_type = "universalbuild".to_string();
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_display_lists_segments() {
        let doc = SegmentDocument::new(segments(), Metadata::default(), PlatformParams::default());
        let text = doc.to_string();
        assert!(text.contains("Segments (2):"));
        assert!(text.contains("dockerfile_maven_build"));
        assert!(text.contains("Java version: 1.8"));
    }
}
