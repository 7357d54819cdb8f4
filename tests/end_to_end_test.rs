mod support;

use segbox::catalog::{JBOSS_DEFAULT, LIBERTY_DEFAULT};
use segbox::framework::FrameworkId;
use segbox::segments::{FileSink, SegmentParameters, FULL_TEMPLATE_FILE};
use segbox::server::ServerSelection;
use segbox::{
    Catalog, FileCategory, Pipeline, PipelineError, RealFileSystem, SegmentKind, ServerType,
};
use std::sync::Arc;
use support::{ProjectFixture, PLAIN_POM, SPRING_BOOT_POM};

fn pipeline() -> Pipeline {
    Pipeline::new(Arc::new(RealFileSystem::new()), Arc::new(Catalog::builtin()))
}

fn pom_with_java(artifact: &str, java: &str, extra: &str) -> String {
    format!(
        r#"<project>
  <artifactId>{artifact}</artifactId>
  <version>1.0</version>
  <properties><java.version>{java}</java.version></properties>
  {extra}
</project>"#
    )
}

#[test]
fn test_framework_port_flows_into_runtime_segment() {
    let fixture = ProjectFixture::new("inventory")
        .file(FileCategory::MavenBuild, "pom.xml", SPRING_BOOT_POM)
        .file(
            FileCategory::ApplicationYml,
            "src/main/resources/application.yml",
            "server:\n  port: 9090\n",
        );

    let report = pipeline().run(&fixture.input()).unwrap();

    assert!(report.framework_detection.is_detected(FrameworkId::SpringBoot));
    assert_eq!(
        report.framework.params.port.iter().copied().collect::<Vec<_>>(),
        vec![9090]
    );
    assert!(report.server.is_embedded());

    let runtime = report.segments.runtime().expect("runtime segment");
    assert_eq!(runtime.segment_id, SegmentKind::SpringBootEmbeddedRuntime);
    match &runtime.parameters {
        SegmentParameters::EmbeddedRuntime {
            port,
            app_file,
            java_image,
        } => {
            assert_eq!(port, &vec![9090]);
            assert_eq!(app_file.as_deref(), Some("inventory-1.2.0.jar"));
            assert_eq!(java_image, "eclipse-temurin:17-jre");
        }
        other => panic!("unexpected parameters: {:?}", other),
    }
}

#[test]
fn test_no_server_signals_is_undefined() {
    let fixture = ProjectFixture::new("legacy").file(FileCategory::MavenBuild, "pom.xml", PLAIN_POM);

    let report = pipeline().run(&fixture.input()).unwrap();

    assert_eq!(report.server_detection.server_type, ServerType::Undefined);
    assert_eq!(report.server_detection.tally.total(), 0);
    let server = report.server.external().expect("external server");
    assert_eq!(server.selection, ServerSelection::ConfigFileFallback);
    assert_eq!(
        report.segments.kinds(),
        vec![SegmentKind::License, SegmentKind::MavenBuild]
    );
}

#[test]
fn test_module_listed_by_parent_directory_descriptor() {
    let fixture = ProjectFixture::new("orders").file(
        FileCategory::MavenBuild,
        "pom.xml",
        r#"<project>
  <parent>
    <groupId>com.example</groupId>
    <artifactId>shop-parent</artifactId>
    <version>2.0</version>
  </parent>
  <artifactId>orders</artifactId>
</project>"#,
    );
    let parent = fixture.write_raw(
        "pom.xml",
        r#"<project>
  <artifactId>shop-parent</artifactId>
  <version>2.0</version>
  <packaging>pom</packaging>
  <modules>
    <module>orders</module>
    <module>billing</module>
  </modules>
</project>"#,
    );

    let report = pipeline().run(&fixture.input()).unwrap();

    let hierarchy = &report.metadata.hierarchy_info;
    assert!(hierarchy.is_module());
    assert_eq!(hierarchy.parent_pom(), Some(parent.as_path()));
    assert_eq!(
        report.metadata.packaging.parent_pom_packaging,
        Some(Some("pom".to_string()))
    );
}

#[test]
fn test_version_missing_from_wildfly_table_uses_sentinel() {
    let liberty = ProjectFixture::new("portal")
        .file(
            FileCategory::MavenBuild,
            "pom.xml",
            &pom_with_java("portal", "1.8.0", ""),
        )
        .dir("src/main/liberty/config");
    let jboss = ProjectFixture::new("ledger")
        .file(
            FileCategory::MavenBuild,
            "pom.xml",
            &pom_with_java("ledger", "1.8.0", ""),
        )
        .dir("src/main/jboss/deployments");

    let pipeline = pipeline();
    let liberty_report = pipeline.run(&liberty.input()).unwrap();
    let jboss_report = pipeline.run(&jboss.input()).unwrap();

    let liberty_server = liberty_report.server.external().unwrap();
    assert_eq!(liberty_server.server_type, ServerType::Liberty);
    assert_eq!(liberty_server.compatible_image, "full-java8-openj9-ubi");
    assert_ne!(liberty_server.compatible_image, LIBERTY_DEFAULT);

    let jboss_server = jboss_report.server.external().unwrap();
    assert_eq!(jboss_server.server_type, ServerType::Jboss);
    assert_eq!(jboss_server.compatible_image, JBOSS_DEFAULT);
}

#[test]
fn test_undetected_framework_on_liberty_gets_liberty_runtime() {
    let fixture = ProjectFixture::new("portal")
        .file(
            FileCategory::MavenBuild,
            "pom.xml",
            &pom_with_java("portal", "11", ""),
        )
        .dir("src/main/liberty/config");

    let report = pipeline().run(&fixture.input()).unwrap();

    let runtime = report.segments.runtime().expect("runtime segment");
    assert_eq!(runtime.segment_id, SegmentKind::OpenLibertyRuntime);
    match &runtime.parameters {
        SegmentParameters::LibertyRuntime {
            port,
            openliberty_image,
        } => {
            assert_eq!(port, &vec![8080]);
            assert_eq!(
                openliberty_image,
                "openliberty/open-liberty:full-java11-openj9-ubi"
            );
        }
        other => panic!("unexpected parameters: {:?}", other),
    }
}

#[test]
fn test_war_on_liberty_uses_server_xml_endpoint() {
    let fixture = ProjectFixture::new("catalog")
        .file(
            FileCategory::MavenBuild,
            "pom.xml",
            r#"<project>
  <artifactId>catalog</artifactId>
  <version>3.1</version>
  <packaging>war</packaging>
  <properties><java.version>17</java.version></properties>
  <dependencies>
    <dependency>
      <groupId>org.springframework.boot</groupId>
      <artifactId>spring-boot-starter-web</artifactId>
    </dependency>
  </dependencies>
</project>"#,
        )
        .file(
            FileCategory::AppConfig,
            "src/main/liberty/config/server.xml",
            r#"<server>
  <httpEndpoint id="defaultHttpEndpoint" httpPort="9080" httpsPort="9443"/>
</server>"#,
        );

    let report = pipeline().run(&fixture.input()).unwrap();

    assert!(!report.server.is_embedded());
    let server = report.server.external().unwrap();
    assert_eq!(server.server_type, ServerType::Liberty);
    assert_eq!(server.http_endpoint, Some(9080));

    let runtime = report.segments.runtime().unwrap();
    match &runtime.parameters {
        SegmentParameters::LibertyRuntime { port, .. } => assert_eq!(port, &vec![9080]),
        other => panic!("unexpected parameters: {:?}", other),
    }
}

#[test]
fn test_vote_tie_leaves_server_undefined() {
    let fixture = ProjectFixture::new("hybrid")
        .file(FileCategory::MavenBuild, "pom.xml", PLAIN_POM)
        .dir("src/main/tomcat")
        .dir("src/main/jboss");

    let report = pipeline().run(&fixture.input()).unwrap();

    assert_eq!(report.server_detection.tally.get(ServerType::Tomcat), 1);
    assert_eq!(report.server_detection.tally.get(ServerType::Jboss), 1);
    assert_eq!(report.server_detection.server_type, ServerType::Undefined);
    assert!(!report.diagnostics.is_empty());
}

#[test]
fn test_runs_are_idempotent() {
    let fixture = ProjectFixture::new("inventory")
        .file(FileCategory::MavenBuild, "pom.xml", SPRING_BOOT_POM)
        .file(
            FileCategory::ApplicationProperties,
            "src/main/resources/application.properties",
            "server.port=8181\n",
        )
        .file(
            FileCategory::Yml,
            "manifest.yml",
            "applications:\n- name: inventory\n  memory: 1G\n",
        );
    let input = fixture.input();
    let pipeline = pipeline();

    let first = pipeline.run(&input).unwrap();
    let second = pipeline.run(&input).unwrap();

    assert_eq!(first.segments, second.segments);
    assert_eq!(first.rendered, second.rendered);
    assert_eq!(
        first.document().to_json().unwrap(),
        second.document().to_json().unwrap()
    );
    assert_eq!(first.platform.applications().count(), 1);
}

#[test]
fn test_unknown_java_version_is_fatal() {
    let fixture = ProjectFixture::new("future").file(
        FileCategory::MavenBuild,
        "pom.xml",
        &pom_with_java("future", "99", ""),
    );

    let err = pipeline().run(&fixture.input()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::UnresolvableBuildImage { ref java_version } if java_version == "99"
    ));
}

#[test]
fn test_unreadable_gradle_file_degrades_to_diagnostic() {
    let fixture = ProjectFixture::new("mobile").file(
        FileCategory::GradleBuild,
        "build.gradle",
        "plugins { id 'java' }\n",
    );
    // Captured, then deleted before the run
    let input = fixture.input();
    std::fs::remove_file(fixture.app_path().join("build.gradle")).unwrap();

    let report = pipeline().run(&input).unwrap();
    assert_eq!(
        report.segments.kinds(),
        vec![SegmentKind::License, SegmentKind::GradleBuild]
    );
    assert!(!report.diagnostics.is_empty());
}

#[test]
fn test_rendered_artifact_persisted_by_file_sink() {
    let fixture = ProjectFixture::new("inventory")
        .file(FileCategory::MavenBuild, "pom.xml", SPRING_BOOT_POM);
    let report = pipeline().run(&fixture.input()).unwrap();

    let out_dir = fixture.root().join("out");
    report.persist(&FileSink::new(&out_dir)).unwrap();

    let written = std::fs::read_to_string(out_dir.join(FULL_TEMPLATE_FILE)).unwrap();
    assert_eq!(written, report.rendered);
    assert!(written.starts_with('#'));
    assert!(written.contains("FROM maven:3-eclipse-temurin-{{ .java_version }} AS build-stage"));
    assert!(written.contains("FROM {{ .java_image }}"));
    assert!(report.document().validate().is_ok());
}

#[test]
fn test_quarkus_project_with_application_properties_gets_quarkus_runtime() {
    let fixture = ProjectFixture::new("orders")
        .file(
            FileCategory::MavenBuild,
            "pom.xml",
            &pom_with_java(
                "orders",
                "17",
                r#"<dependencies>
    <dependency>
      <groupId>io.quarkus</groupId>
      <artifactId>quarkus-resteasy</artifactId>
    </dependency>
  </dependencies>"#,
            ),
        )
        .file(
            FileCategory::ApplicationProperties,
            "src/main/resources/application.properties",
            "quarkus.http.port=8081\n",
        );

    let report = pipeline().run(&fixture.input()).unwrap();

    assert_eq!(report.framework_detection.detected(), Some(FrameworkId::Quarkus));
    assert!(!report.framework_detection.is_detected(FrameworkId::SpringBoot));
    let runtime = report.segments.runtime().expect("runtime segment");
    assert_eq!(runtime.segment_id, SegmentKind::QuarkusEmbeddedRuntime);
}
