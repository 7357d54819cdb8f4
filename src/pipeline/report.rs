//! Everything one project run decided, and why

use crate::capture::BuildType;
use crate::classifier::CandidateImage;
use crate::diagnostics::Diagnostics;
use crate::error::PipelineError;
use crate::framework::{DetectionMethod, ExtractedFramework, FrameworkResult};
use crate::manifest::PlatformParams;
use crate::metadata::Metadata;
use crate::output::schema::SegmentDocument;
use crate::segments::{ArtifactSink, SegmentList};
use crate::server::{ServerDetectionResult, ServerParams};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub project: String,
    pub app_path: PathBuf,
    pub build_type: BuildType,
    pub metadata: Metadata,
    pub framework_detection: FrameworkResult,
    pub detection_method: DetectionMethod,
    pub framework: ExtractedFramework,
    pub server_detection: ServerDetectionResult,
    pub server: ServerParams,
    #[serde(skip_serializing_if = "PlatformParams::is_empty")]
    pub platform: PlatformParams,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggested_images: Vec<CandidateImage>,
    pub segments: SegmentList,
    /// Concatenated template text
    #[serde(skip)]
    pub rendered: String,
    pub diagnostics: Diagnostics,
}

impl PipelineReport {
    pub fn document(&self) -> SegmentDocument {
        SegmentDocument::new(
            self.segments.clone(),
            self.metadata.clone(),
            self.platform.clone(),
        )
    }

    pub fn persist(&self, sink: &dyn ArtifactSink) -> Result<(), PipelineError> {
        sink.persist(&self.rendered)?;
        Ok(())
    }
}
