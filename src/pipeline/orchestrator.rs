use super::context::ProjectInput;
use super::report::PipelineReport;
use crate::capture::BuildType;
use crate::catalog::Catalog;
use crate::classifier::{suggest_images, CandidateImage, ClassificationRequest, ClassificationService};
use crate::diagnostics::{Diagnostics, Stage};
use crate::error::PipelineError;
use crate::framework::params::extract_framework_params;
use crate::framework::{ExtractedFramework, FrameworkDetector, FrameworkRegistry};
use crate::fs::FileSystem;
use crate::manifest::ManifestExtractor;
use crate::metadata::{Metadata, MetadataExtractor};
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::segments::{SegmentIntegrator, SegmentTemplates};
use crate::server::{ServerDetector, ServerParameterExtractor, ServerParams, VoteContext};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runs every stage for one project, in order.
///
/// Cheap to clone; all shared state sits behind `Arc`s so a batch can hand one
/// clone to each worker.
#[derive(Clone)]
pub struct Pipeline {
    fs: Arc<dyn FileSystem>,
    catalog: Arc<Catalog>,
    registry: Arc<FrameworkRegistry>,
    templates: Arc<SegmentTemplates>,
    server_detector: Arc<ServerDetector>,
    classifier: Option<Arc<dyn ClassificationService>>,
    progress: Arc<dyn ProgressHandler>,
}

impl Pipeline {
    pub fn new(fs: Arc<dyn FileSystem>, catalog: Arc<Catalog>) -> Self {
        Self {
            fs,
            catalog,
            registry: Arc::new(FrameworkRegistry::with_defaults()),
            templates: Arc::new(SegmentTemplates::builtin()),
            server_detector: Arc::new(ServerDetector::with_defaults()),
            classifier: None,
            progress: Arc::new(NoOpHandler),
        }
    }

    pub fn with_templates(mut self, templates: SegmentTemplates) -> Self {
        self.templates = Arc::new(templates);
        self
    }

    pub fn with_registry(mut self, registry: FrameworkRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_server_detector(mut self, detector: ServerDetector) -> Self {
        self.server_detector = Arc::new(detector);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ClassificationService>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn run(&self, input: &ProjectInput) -> Result<PipelineReport, PipelineError> {
        let start = Instant::now();
        let project = input.basename.clone();
        info!(project = %project, app_path = %input.app_path.display(), "Starting pipeline");
        self.progress.on_progress(&ProgressEvent::Started {
            project: project.clone(),
        });

        match self.run_stages(input) {
            Ok(report) => {
                info!(
                    project = %project,
                    segments = report.segments.len(),
                    diagnostics = report.diagnostics.len(),
                    "Pipeline complete"
                );
                self.progress.on_progress(&ProgressEvent::Completed {
                    project,
                    segments: report.segments.len(),
                    diagnostics: report.diagnostics.len(),
                    total_time: start.elapsed(),
                });
                Ok(report)
            }
            Err(e) => {
                self.progress.on_progress(&ProgressEvent::Failed {
                    project,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn stage<T>(&self, project: &str, stage: Stage, f: impl FnOnce() -> T) -> T {
        self.progress.on_progress(&ProgressEvent::StageStarted {
            project: project.to_string(),
            stage,
        });
        let started = Instant::now();
        let value = f();
        self.progress.on_progress(&ProgressEvent::StageComplete {
            project: project.to_string(),
            stage,
            duration: started.elapsed(),
        });
        value
    }

    fn run_stages(&self, input: &ProjectInput) -> Result<PipelineReport, PipelineError> {
        let project = input.basename.as_str();
        let captured = &input.captured;
        let fs = self.fs.as_ref();
        let mut diags = Diagnostics::new();

        let build_type = captured.build_type();
        if build_type == BuildType::Undefined {
            return Err(PipelineError::UndefinedBuildType);
        }
        if !captured.has_descriptor_for_build_type() {
            return Err(PipelineError::MissingBuildDescriptor { build_type });
        }

        let metadata = self.stage(project, Stage::Metadata, || {
            MetadataExtractor::new(fs, &input.app_path, project).extract(captured, &mut diags)
        });
        let java_version = metadata.java_version().to_string();

        let (framework_detection, framework) = self.stage(project, Stage::Framework, || {
            let detection = FrameworkDetector::new(&self.registry, fs).detect(captured, &mut diags);
            let extracted =
                extract_framework_params(&detection, &self.registry, fs, captured, project, &mut diags);
            (detection, extracted)
        });
        debug!(project, framework = %framework.key, method = ?framework_detection.method(), "Framework resolved");

        let (server_detection, server) = self.stage(project, Stage::Server, || {
            let ctx = VoteContext {
                fs,
                app_path: &input.app_path,
                captured,
            };
            let detection = self.server_detector.detect(
                &ctx,
                framework.is_detected(),
                &metadata.packaging,
                &mut diags,
            );
            let params = ServerParameterExtractor::new(fs, &self.catalog)
                .extract(&detection, captured, &metadata, &mut diags);
            (detection, params)
        });

        let platform = self.stage(project, Stage::Manifest, || {
            ManifestExtractor::new(fs).extract(captured, &mut diags)
        });

        let suggested_images = match &self.classifier {
            Some(service) => self.stage(project, Stage::Classifier, || {
                let request = classification_request(project, &metadata, &framework, &server);
                suggest_images(service.as_ref(), &request, &mut diags)
            }),
            None => Vec::<CandidateImage>::new(),
        };

        let (segments, rendered) = self.stage(project, Stage::Segments, || {
            let app_name = framework
                .params
                .app_name
                .clone()
                .unwrap_or_else(|| project.to_string());

            let mut integrator = SegmentIntegrator::new(&self.catalog, &self.registry);
            integrator.add_license()?;
            integrator.add_build_segment(build_type, &app_name, &java_version)?;
            integrator.add_runtime_segment(&framework, &server, &java_version, &mut diags)?;
            let rendered = integrator.render(&self.templates)?;
            Ok::<_, PipelineError>((integrator.into_segments(), rendered))
        })?;

        Ok(PipelineReport {
            project: project.to_string(),
            app_path: input.app_path.clone(),
            build_type,
            detection_method: framework_detection.method(),
            framework_detection,
            metadata,
            framework,
            server_detection,
            server,
            platform,
            suggested_images,
            segments,
            rendered,
            diagnostics: diags,
        })
    }
}

fn classification_request(
    project: &str,
    metadata: &Metadata,
    framework: &ExtractedFramework,
    server: &ServerParams,
) -> ClassificationRequest {
    let mut technologies = vec![format!("java {}", metadata.java_version())];
    if framework.is_detected() {
        technologies.push(framework.key.to_string());
    }
    match server.external() {
        Some(external) => technologies.push(external.server_type.to_string()),
        None => technologies.push("embedded server".to_string()),
    }

    ClassificationRequest {
        application_name: project.to_string(),
        application_description: metadata
            .description
            .clone()
            .unwrap_or_else(|| project.to_string()),
        technology_summary: format!("{}: {}", project, technologies.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{BuildType, CapturedData, FileCategory};
    use crate::classifier::MockClassificationService;
    use crate::fs::MockFileSystem;
    use crate::segments::SegmentKind;
    use crate::server::ServerType;
    use std::sync::Mutex;

    const SPRING_POM: &str = r#"<project>
  <artifactId>shop</artifactId>
  <properties><java.version>11</java.version></properties>
  <dependencies>
    <dependency>
      <groupId>org.springframework.boot</groupId>
      <artifactId>spring-boot-starter-web</artifactId>
    </dependency>
  </dependencies>
</project>"#;

    fn spring_project() -> (Arc<MockFileSystem>, ProjectInput) {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/work/shop/pom.xml", SPRING_POM);
        fs.add_file(
            "/work/shop/src/main/resources/application.properties",
            "server.port=9090\n",
        );
        let captured = CapturedData::new(BuildType::Maven)
            .with_files(FileCategory::MavenBuild, ["/work/shop/pom.xml"])
            .with_files(
                FileCategory::ApplicationProperties,
                ["/work/shop/src/main/resources/application.properties"],
            );
        (fs, ProjectInput::new("/work/shop", captured))
    }

    #[derive(Default)]
    struct RecordingHandler {
        events: Mutex<Vec<String>>,
    }

    impl ProgressHandler for RecordingHandler {
        fn on_progress(&self, event: &ProgressEvent) {
            let label = match event {
                ProgressEvent::Started { .. } => "started".to_string(),
                ProgressEvent::StageStarted { stage, .. } => format!("start:{}", stage),
                ProgressEvent::StageComplete { stage, .. } => format!("done:{}", stage),
                ProgressEvent::Completed { .. } => "completed".to_string(),
                ProgressEvent::Failed { .. } => "failed".to_string(),
            };
            self.events.lock().unwrap().push(label);
        }
    }

    #[test]
    fn test_spring_boot_embedded_project() {
        let (fs, input) = spring_project();
        let pipeline = Pipeline::new(fs, Arc::new(Catalog::builtin()));

        let report = pipeline.run(&input).unwrap();
        assert_eq!(
            report.segments.kinds(),
            vec![
                SegmentKind::License,
                SegmentKind::MavenBuild,
                SegmentKind::SpringBootEmbeddedRuntime
            ]
        );
        assert!(report.server.is_embedded());
        assert!(report.rendered.contains("FROM maven:3-eclipse-temurin"));
        assert!(report.suggested_images.is_empty());
    }

    #[test]
    fn test_missing_descriptor_is_fatal() {
        let fs = Arc::new(MockFileSystem::new());
        let input = ProjectInput::new("/work/shop", CapturedData::new(BuildType::Maven));
        let pipeline = Pipeline::new(fs, Arc::new(Catalog::builtin()));

        assert!(matches!(
            pipeline.run(&input),
            Err(PipelineError::MissingBuildDescriptor {
                build_type: BuildType::Maven
            })
        ));
    }

    #[test]
    fn test_progress_events_in_stage_order() {
        let (fs, input) = spring_project();
        let handler = Arc::new(RecordingHandler::default());
        let pipeline =
            Pipeline::new(fs, Arc::new(Catalog::builtin())).with_progress(handler.clone());

        pipeline.run(&input).unwrap();
        let events = handler.events.lock().unwrap().clone();
        assert_eq!(events.first().map(String::as_str), Some("started"));
        assert_eq!(events.last().map(String::as_str), Some("completed"));
        let starts: Vec<_> = events.iter().filter(|e| e.starts_with("start:")).collect();
        assert_eq!(
            starts,
            vec![
                "start:metadata",
                "start:framework",
                "start:server",
                "start:manifest",
                "start:segments"
            ]
        );
    }

    #[test]
    fn test_failure_emits_failed_event() {
        let fs = Arc::new(MockFileSystem::new());
        let handler = Arc::new(RecordingHandler::default());
        let pipeline =
            Pipeline::new(fs, Arc::new(Catalog::builtin())).with_progress(handler.clone());

        let input = ProjectInput::new("/work/empty", CapturedData::default());
        assert!(matches!(
            pipeline.run(&input),
            Err(PipelineError::UndefinedBuildType)
        ));
        assert_eq!(
            *handler.events.lock().unwrap(),
            vec!["started".to_string(), "failed".to_string()]
        );
    }

    #[test]
    fn test_undefined_build_type_skips_classifier() {
        let fs = Arc::new(MockFileSystem::new());
        let mut service = MockClassificationService::new();
        service.expect_standardize().never();
        service.expect_candidate_images().never();
        let pipeline = Pipeline::new(fs, Arc::new(Catalog::builtin())).with_classifier(Arc::new(service));

        let captured = CapturedData::new(BuildType::Undefined).with_files(
            FileCategory::ApplicationProperties,
            ["/work/empty/src/main/resources/application.properties"],
        );
        let input = ProjectInput::new("/work/empty", captured);
        assert!(matches!(
            pipeline.run(&input),
            Err(PipelineError::UndefinedBuildType)
        ));
    }

    #[test]
    fn test_classifier_suggestions_recorded() {
        let (fs, input) = spring_project();
        let mut service = MockClassificationService::new();
        service
            .expect_standardize()
            .withf(|req| req.application_name == "shop" && req.technology_summary.contains("java 11"))
            .returning(|_| Ok(vec![serde_json::json!({"Name": "shop"})]));
        service.expect_candidate_images().returning(|_| {
            Ok(vec![CandidateImage {
                name: "eclipse-temurin".to_string(),
                url: "https://hub.docker.com/_/eclipse-temurin".to_string(),
            }])
        });

        let pipeline =
            Pipeline::new(fs, Arc::new(Catalog::builtin())).with_classifier(Arc::new(service));
        let report = pipeline.run(&input).unwrap();
        assert_eq!(report.suggested_images.len(), 1);
    }

    #[test]
    fn test_request_names_external_server() {
        let metadata = Metadata::default();
        let framework = ExtractedFramework {
            key: crate::framework::FrameworkKey::Undefined,
            params: Default::default(),
        };
        let server = ServerParams::External(crate::server::ExternalServer {
            server_type: ServerType::Liberty,
            compatible_image: "LIBERTY_DEFAULT".to_string(),
            exposed_ports: vec![],
            user: None,
            http_endpoint: None,
            selection: crate::server::ServerSelection::Voted,
        });

        let request = classification_request("billing", &metadata, &framework, &server);
        assert_eq!(request.application_description, "billing");
        assert_eq!(request.technology_summary, "billing: java 1.8, liberty");
    }
}
