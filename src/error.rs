//! Fatal, per-project pipeline errors

use crate::capture::BuildType;
use crate::segments::SegmentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Build type says Maven or Gradle but no descriptor of that kind was captured
    #[error("Build type is {build_type} but no {build_type} build descriptor was captured")]
    MissingBuildDescriptor { build_type: BuildType },

    /// No build segment can be chosen without a build tool
    #[error("Build type is undefined; cannot choose a build segment")]
    UndefinedBuildType,

    /// The build-image table has no entry for the project's Java version
    #[error("No build image registered for Java version '{java_version}'")]
    UnresolvableBuildImage { java_version: String },

    #[error(transparent)]
    Segment(#[from] SegmentError),

    /// Worker task panicked or was aborted (batch runs only)
    #[error("Project worker failed: {0}")]
    Worker(String),
}

impl PipelineError {
    /// Short machine-friendly kind, used in batch summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingBuildDescriptor { .. } => "missing_build_descriptor",
            Self::UndefinedBuildType => "undefined_build_type",
            Self::UnresolvableBuildImage { .. } => "unresolvable_build_image",
            Self::Segment(e) => e.kind(),
            Self::Worker(_) => "worker",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = PipelineError::UnresolvableBuildImage {
            java_version: "1.8.0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No build image registered for Java version '1.8.0'"
        );
        assert_eq!(err.kind(), "unresolvable_build_image");

        let err = PipelineError::MissingBuildDescriptor {
            build_type: BuildType::Gradle,
        };
        assert!(err.to_string().contains("gradle build descriptor"));
    }

    #[test]
    fn test_segment_errors_pass_through() {
        let err: PipelineError = SegmentError::InvalidTransition {
            state: "Initialized",
            action: "render",
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Cannot render while integrator is in state Initialized"
        );
        assert_eq!(err.kind(), "invalid_transition");
    }
}
