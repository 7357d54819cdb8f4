use super::{Segment, SegmentError, SegmentKind, SegmentList, SegmentParameters, SegmentTemplates};
use crate::capture::BuildType;
use crate::catalog::{Catalog, JAVA_DEFAULT};
use crate::diagnostics::{Diagnostics, Stage};
use crate::error::PipelineError;
use crate::framework::{ExtractedFramework, FrameworkRegistry};
use crate::server::{ExternalServer, ServerParams, ServerType};
use tracing::debug;

const FALLBACK_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorState {
    Initialized,
    LicenseAdded,
    BuildSegmentAdded,
    RuntimeSegmentAdded,
    NoRuntimeSegment,
    Rendered,
}

impl IntegratorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "Initialized",
            Self::LicenseAdded => "LicenseAdded",
            Self::BuildSegmentAdded => "BuildSegmentAdded",
            Self::RuntimeSegmentAdded => "RuntimeSegmentAdded",
            Self::NoRuntimeSegment => "NoRuntimeSegment",
            Self::Rendered => "Rendered",
        }
    }
}

/// Builds the segment list one step at a time.
///
/// Steps must be taken in order: license, build, runtime, render. Any other
/// order fails with [`SegmentError::InvalidTransition`].
pub struct SegmentIntegrator<'a> {
    catalog: &'a Catalog,
    registry: &'a FrameworkRegistry,
    state: IntegratorState,
    segments: SegmentList,
}

impl<'a> SegmentIntegrator<'a> {
    pub fn new(catalog: &'a Catalog, registry: &'a FrameworkRegistry) -> Self {
        Self {
            catalog,
            registry,
            state: IntegratorState::Initialized,
            segments: SegmentList::new(),
        }
    }

    pub fn state(&self) -> IntegratorState {
        self.state
    }

    pub fn segments(&self) -> &SegmentList {
        &self.segments
    }

    pub fn into_segments(self) -> SegmentList {
        self.segments
    }

    fn expect_state(&self, allowed: &[IntegratorState], action: &'static str) -> Result<(), SegmentError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SegmentError::InvalidTransition {
                state: self.state.as_str(),
                action,
            })
        }
    }

    pub fn add_license(&mut self) -> Result<(), PipelineError> {
        self.expect_state(&[IntegratorState::Initialized], "add the license segment")?;
        self.segments
            .push(Segment::new(SegmentKind::License, SegmentParameters::None));
        self.state = IntegratorState::LicenseAdded;
        Ok(())
    }

    /// Build segment for the build tool, keyed by the exact Java version string
    pub fn add_build_segment(
        &mut self,
        build_type: BuildType,
        app_name: &str,
        java_version: &str,
    ) -> Result<(), PipelineError> {
        self.expect_state(&[IntegratorState::LicenseAdded], "add a build segment")?;

        let kind = match build_type {
            BuildType::Maven => SegmentKind::MavenBuild,
            BuildType::Gradle => SegmentKind::GradleBuild,
            BuildType::Undefined => return Err(PipelineError::UndefinedBuildType),
        };

        let build_image = self.catalog.build_image(java_version).ok_or_else(|| {
            PipelineError::UnresolvableBuildImage {
                java_version: java_version.to_string(),
            }
        })?;
        debug!(java_version, build_image, segment = kind.dir_name(), "Resolved build image");

        self.segments.push(Segment::new(
            kind,
            SegmentParameters::Build {
                app_name: app_name.to_string(),
                java_version: build_image.to_string(),
            },
        ));
        self.state = IntegratorState::BuildSegmentAdded;
        Ok(())
    }

    /// Adds the runtime segment, if any applies to this framework/server pair
    pub fn add_runtime_segment(
        &mut self,
        framework: &ExtractedFramework,
        server: &ServerParams,
        java_version: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), PipelineError> {
        self.expect_state(&[IntegratorState::BuildSegmentAdded], "add a runtime segment")?;

        let segment = match (framework.key.framework(), server) {
            (Some(_), ServerParams::External(s)) if s.server_type == ServerType::Jboss => {
                Some(self.jboss_segment(framework, s))
            }
            (Some(_), ServerParams::External(s)) if s.server_type == ServerType::Liberty => {
                let port = match s.http_endpoint {
                    Some(endpoint) => vec![endpoint],
                    None => ports_or_fallback(framework),
                };
                Some(liberty_segment(s, port))
            }
            (Some(id), ServerParams::Embedded) => match self.registry.get(id) {
                Some(fw) => Some(self.embedded_segment(
                    fw.embedded_segment(),
                    framework,
                    java_version,
                    diagnostics,
                )),
                None => {
                    diagnostics.warn(
                        Stage::Segments,
                        format!("Framework {} is not registered; no runtime segment", id),
                    );
                    None
                }
            },
            (None, ServerParams::External(s)) if s.server_type == ServerType::Liberty => {
                Some(liberty_segment(s, ports_or_fallback(framework)))
            }
            _ => None,
        };

        match segment {
            Some(segment) => {
                debug!(segment = segment.segment_id.dir_name(), "Runtime segment chosen");
                self.segments.push(segment);
                self.state = IntegratorState::RuntimeSegmentAdded;
            }
            None => {
                debug!(framework = %framework.key, "No runtime segment applies");
                self.state = IntegratorState::NoRuntimeSegment;
            }
        }
        Ok(())
    }

    /// Concatenates the template of every segment, each followed by a blank line
    pub fn render(&mut self, templates: &SegmentTemplates) -> Result<String, PipelineError> {
        self.expect_state(
            &[
                IntegratorState::RuntimeSegmentAdded,
                IntegratorState::NoRuntimeSegment,
            ],
            "render",
        )?;

        let mut rendered = String::new();
        for segment in self.segments.iter() {
            let text = templates
                .get(segment.segment_id)
                .ok_or_else(|| SegmentError::MissingTemplate {
                    segment: segment.segment_id.dir_name().to_string(),
                })?;
            rendered.push_str(text);
            if !text.ends_with('\n') {
                rendered.push('\n');
            }
            rendered.push('\n');
        }

        self.state = IntegratorState::Rendered;
        Ok(rendered)
    }

    fn jboss_segment(&self, framework: &ExtractedFramework, server: &ExternalServer) -> Segment {
        let app_file = framework.params.app_file.clone();
        Segment::new(
            SegmentKind::JbossRuntime,
            SegmentParameters::JbossRuntime {
                port: framework.params.port.iter().copied().collect(),
                deployment_file: app_file.clone(),
                app_file,
                jboss_image: Catalog::image_reference(ServerType::Jboss, &server.compatible_image),
                deployment_path: self
                    .catalog
                    .jboss_deployment_path()
                    .unwrap_or_default()
                    .to_string(),
            },
        )
    }

    fn embedded_segment(
        &self,
        kind: SegmentKind,
        framework: &ExtractedFramework,
        java_version: &str,
        diagnostics: &mut Diagnostics,
    ) -> Segment {
        let java_image = match self.catalog.runtime_image(java_version) {
            Some(image) => image.to_string(),
            None => {
                diagnostics.warn(
                    Stage::Segments,
                    format!(
                        "No runtime image for Java version '{}'; using {}",
                        java_version, JAVA_DEFAULT
                    ),
                );
                JAVA_DEFAULT.to_string()
            }
        };

        Segment::new(
            kind,
            SegmentParameters::EmbeddedRuntime {
                port: framework.params.port.iter().copied().collect(),
                app_file: framework.params.app_file.clone(),
                java_image,
            },
        )
    }
}

fn ports_or_fallback(framework: &ExtractedFramework) -> Vec<u16> {
    if framework.params.port.is_empty() {
        vec![FALLBACK_PORT]
    } else {
        framework.params.port.iter().copied().collect()
    }
}

fn liberty_segment(server: &ExternalServer, port: Vec<u16>) -> Segment {
    Segment::new(
        SegmentKind::OpenLibertyRuntime,
        SegmentParameters::LibertyRuntime {
            port,
            openliberty_image: Catalog::image_reference(ServerType::Liberty, &server.compatible_image),
        },
    )
}
