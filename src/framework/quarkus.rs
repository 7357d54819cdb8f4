//! Quarkus

use super::*;

pub struct QuarkusFramework;

impl Framework for QuarkusFramework {
    fn id(&self) -> FrameworkId {
        FrameworkId::Quarkus
    }

    fn dependency_patterns(&self) -> Vec<DependencyPattern> {
        vec![DependencyPattern::regex(r"io\.quarkus:quarkus-[\w-]+")]
    }

    fn yaml_port_path(&self) -> Vec<&'static str> {
        vec!["quarkus", "http", "port"]
    }

    fn embedded_segment(&self) -> SegmentKind {
        SegmentKind::QuarkusEmbeddedRuntime
    }
}
