//! Ordered, parameterized Dockerfile segments and their rendering
//!
//! A project's artifact is always the license segment, exactly one build
//! segment and at most one runtime segment, concatenated in that order.

mod integrator;
mod sink;
mod templates;

pub use integrator::{IntegratorState, SegmentIntegrator};
pub use sink::{ArtifactSink, FileSink, MemorySink, FULL_TEMPLATE_FILE};
pub use templates::SegmentTemplates;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

crate::define_id_enum! {
    /// Segment identifier; the wire form is the template path
    SegmentKind {
        License => "segments/dockerfile_license/Dockerfile" : "dockerfile_license",
        MavenBuild => "segments/dockerfile_maven_build/Dockerfile" : "dockerfile_maven_build",
        GradleBuild => "segments/dockerfile_gradle_build/Dockerfile" : "dockerfile_gradle_build",
        JbossRuntime => "segments/dockerfile_jboss_runtime/Dockerfile" : "dockerfile_jboss_runtime",
        OpenLibertyRuntime => "segments/dockerfile_openliberty_runtime/Dockerfile" : "dockerfile_openliberty_runtime",
        SpringBootEmbeddedRuntime => "segments/dockerfile_springboot_embedded_server_runtime/Dockerfile"
            : "dockerfile_springboot_embedded_server_runtime",
        QuarkusEmbeddedRuntime => "segments/dockerfile_quarkus_embedded_server_runtime/Dockerfile"
            : "dockerfile_quarkus_embedded_server_runtime",
    }
}

impl SegmentKind {
    /// Template directory name, e.g. `dockerfile_license`
    pub fn dir_name(&self) -> &'static str {
        self.name()
    }

    pub fn is_runtime(&self) -> bool {
        !matches!(
            self,
            SegmentKind::License | SegmentKind::MavenBuild | SegmentKind::GradleBuild
        )
    }
}

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Cannot {action} while integrator is in state {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    #[error("No template available for segment {segment}")]
    MissingTemplate { segment: String },

    #[error("Failed to persist artifact to {path:?}: {message}")]
    Persist { path: PathBuf, message: String },
}

impl SegmentError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::MissingTemplate { .. } => "missing_template",
            Self::Persist { .. } => "persist",
        }
    }
}

/// Template parameters; field names are the placeholders the templates use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentParameters {
    None,
    Build {
        app_name: String,
        java_version: String,
    },
    JbossRuntime {
        port: Vec<u16>,
        app_file: Option<String>,
        jboss_image: String,
        deployment_file: Option<String>,
        deployment_path: String,
    },
    LibertyRuntime {
        port: Vec<u16>,
        openliberty_image: String,
    },
    EmbeddedRuntime {
        port: Vec<u16>,
        app_file: Option<String>,
        java_image: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub segment_id: SegmentKind,
    pub parameters: SegmentParameters,
}

impl Segment {
    pub fn new(segment_id: SegmentKind, parameters: SegmentParameters) -> Self {
        Self {
            segment_id,
            parameters,
        }
    }
}

/// Serialized flat: `{"segment_id": "...", <parameters>}`
impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("segment_id", &self.segment_id)?;

        match &self.parameters {
            SegmentParameters::None => {}
            SegmentParameters::Build {
                app_name,
                java_version,
            } => {
                map.serialize_entry("app_name", app_name)?;
                map.serialize_entry("java_version", java_version)?;
            }
            SegmentParameters::JbossRuntime {
                port,
                app_file,
                jboss_image,
                deployment_file,
                deployment_path,
            } => {
                map.serialize_entry("port", port)?;
                map.serialize_entry("app_file", app_file)?;
                map.serialize_entry("jboss_image", jboss_image)?;
                map.serialize_entry("deployment_file", deployment_file)?;
                map.serialize_entry("deployment_path", deployment_path)?;
            }
            SegmentParameters::LibertyRuntime {
                port,
                openliberty_image,
            } => {
                map.serialize_entry("port", port)?;
                map.serialize_entry("openliberty_image", openliberty_image)?;
            }
            SegmentParameters::EmbeddedRuntime {
                port,
                app_file,
                java_image,
            } => {
                map.serialize_entry("port", port)?;
                map.serialize_entry("app_file", app_file)?;
                map.serialize_entry("java_image", java_image)?;
            }
        }

        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SegmentList(Vec<Segment>);

impl SegmentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.0.iter()
    }

    pub fn kinds(&self) -> Vec<SegmentKind> {
        self.0.iter().map(|s| s.segment_id).collect()
    }

    pub fn runtime(&self) -> Option<&Segment> {
        self.0.iter().find(|s| s.segment_id.is_runtime())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
