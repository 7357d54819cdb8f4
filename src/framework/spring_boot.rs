//! Spring Boot

use super::*;

pub struct SpringBootFramework;

impl Framework for SpringBootFramework {
    fn id(&self) -> FrameworkId {
        FrameworkId::SpringBoot
    }

    fn dependency_patterns(&self) -> Vec<DependencyPattern> {
        vec![DependencyPattern::maven(
            "org.springframework.boot:spring-boot-starter",
        )]
    }

    fn config_files(&self) -> Vec<&'static str> {
        vec![
            "application.yml",
            "application.yaml",
            "application.properties",
        ]
    }

    fn yaml_port_path(&self) -> Vec<&'static str> {
        vec!["server", "port"]
    }

    fn embedded_segment(&self) -> SegmentKind {
        SegmentKind::SpringBootEmbeddedRuntime
    }
}
