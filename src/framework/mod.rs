//! Application framework detection and parameter extraction

pub mod detector;
pub mod params;
mod quarkus;
mod spring_boot;

pub use detector::FrameworkDetector;
pub use params::{FrameworkParameterExtractor, HeuristicParameterExtractor};
pub use quarkus::QuarkusFramework;
pub use spring_boot::SpringBootFramework;

use crate::segments::SegmentKind;
use regex::Regex;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

crate::define_id_enum! {
    FrameworkId {
        SpringBoot => "springboot" : "Spring Boot",
        Quarkus => "quarkus" : "Quarkus",
    }
}

/// How a dependency pattern is compared against a coordinate or build-file line
#[derive(Debug, Clone)]
pub enum DependencyPatternType {
    /// Substring match on `groupId:artifactId`
    MavenGroupArtifact,
    Regex,
}

#[derive(Debug, Clone)]
pub struct DependencyPattern {
    pub pattern_type: DependencyPatternType,
    pub pattern: String,
}

impl DependencyPattern {
    pub fn maven(pattern: &str) -> Self {
        Self {
            pattern_type: DependencyPatternType::MavenGroupArtifact,
            pattern: pattern.to_string(),
        }
    }

    pub fn regex(pattern: &str) -> Self {
        Self {
            pattern_type: DependencyPatternType::Regex,
            pattern: pattern.to_string(),
        }
    }

    pub fn matches(&self, haystack: &str) -> bool {
        match self.pattern_type {
            DependencyPatternType::MavenGroupArtifact => haystack.contains(&self.pattern),
            DependencyPatternType::Regex => Regex::new(&self.pattern)
                .map(|re| re.is_match(haystack))
                .unwrap_or(false),
        }
    }
}

/// Framework-specific knowledge the detector and extractors consult
pub trait Framework: Send + Sync {
    fn id(&self) -> FrameworkId;

    /// Starter dependencies that identify the framework
    fn dependency_patterns(&self) -> Vec<DependencyPattern>;

    /// Application config file names whose presence alone identifies the framework
    fn config_files(&self) -> Vec<&'static str> {
        vec![]
    }

    /// Key path of the HTTP port inside the framework's YAML config
    fn yaml_port_path(&self) -> Vec<&'static str>;

    fn default_ports(&self) -> Vec<u16> {
        vec![8080]
    }

    /// Runtime segment used when the app ships its own server
    fn embedded_segment(&self) -> SegmentKind;
}

/// Known frameworks in detection priority order
pub struct FrameworkRegistry {
    frameworks: Vec<Arc<dyn Framework>>,
}

impl FrameworkRegistry {
    pub fn new(frameworks: Vec<Arc<dyn Framework>>) -> Self {
        Self { frameworks }
    }

    pub fn with_defaults() -> Self {
        Self::new(vec![
            Arc::new(SpringBootFramework),
            Arc::new(QuarkusFramework),
        ])
    }

    pub fn frameworks(&self) -> &[Arc<dyn Framework>] {
        &self.frameworks
    }

    pub fn get(&self, id: FrameworkId) -> Option<&Arc<dyn Framework>> {
        self.frameworks.iter().find(|f| f.id() == id)
    }
}

impl Default for FrameworkRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    /// A starter dependency or config file matched
    Rule,
    /// No rule fired
    Heuristic,
}

/// Per-framework detection outcome, in registry order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkResult {
    detections: Vec<(FrameworkId, bool)>,
    method: DetectionMethod,
}

impl FrameworkResult {
    pub fn new(detections: Vec<(FrameworkId, bool)>, method: DetectionMethod) -> Self {
        Self { detections, method }
    }

    /// The framework the pipeline acts on: first detected in registry order
    pub fn detected(&self) -> Option<FrameworkId> {
        self.detections
            .iter()
            .find(|(_, detected)| *detected)
            .map(|(id, _)| *id)
    }

    pub fn is_detected(&self, id: FrameworkId) -> bool {
        self.detections.iter().any(|(f, d)| *f == id && *d)
    }

    pub fn method(&self) -> DetectionMethod {
        self.method
    }

    pub fn key(&self) -> FrameworkKey {
        self.detected()
            .map(FrameworkKey::Detected)
            .unwrap_or(FrameworkKey::Undefined)
    }
}

impl Serialize for FrameworkResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.detections.len()))?;
        for (id, detected) in &self.detections {
            map.serialize_entry(id.as_str(), detected)?;
        }
        map.end()
    }
}

/// Which bucket framework parameters belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameworkKey {
    Detected(FrameworkId),
    /// Heuristic bucket, no framework matched
    Undefined,
}

impl FrameworkKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detected(id) => id.as_str(),
            Self::Undefined => "undefined",
        }
    }

    pub fn framework(&self) -> Option<FrameworkId> {
        match self {
            Self::Detected(id) => Some(*id),
            Self::Undefined => None,
        }
    }
}

impl std::fmt::Display for FrameworkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FrameworkKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrameworkParams {
    pub port: BTreeSet<u16>,
    pub app_file: Option<String>,
    pub app_name: Option<String>,
}

/// Parameters of the acted-upon framework, or of the heuristic bucket.
/// Serializes as `{"<key>": {port, app_file, app_name}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFramework {
    pub key: FrameworkKey,
    pub params: FrameworkParams,
}

impl ExtractedFramework {
    pub fn is_detected(&self) -> bool {
        self.key.framework().is_some()
    }
}

impl Serialize for ExtractedFramework {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key.as_str(), &self.params)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order() {
        let registry = FrameworkRegistry::with_defaults();
        let ids: Vec<_> = registry.frameworks().iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec![FrameworkId::SpringBoot, FrameworkId::Quarkus]);
        assert!(registry.get(FrameworkId::Quarkus).is_some());
    }

    #[test]
    fn test_maven_pattern_is_substring() {
        let pattern = DependencyPattern::maven("org.springframework.boot:spring-boot-starter");
        assert!(pattern.matches("org.springframework.boot:spring-boot-starter-web"));
        assert!(pattern.matches("    implementation 'org.springframework.boot:spring-boot-starter-web'"));
        assert!(!pattern.matches("org.springframework:spring-core"));
    }

    #[test]
    fn test_first_detected_wins() {
        let result = FrameworkResult::new(
            vec![(FrameworkId::SpringBoot, true), (FrameworkId::Quarkus, true)],
            DetectionMethod::Rule,
        );
        assert_eq!(result.detected(), Some(FrameworkId::SpringBoot));
        assert_eq!(result.key(), FrameworkKey::Detected(FrameworkId::SpringBoot));
    }

    #[test]
    fn test_nothing_detected_is_undefined_bucket() {
        let result = FrameworkResult::new(
            vec![(FrameworkId::SpringBoot, false), (FrameworkId::Quarkus, false)],
            DetectionMethod::Heuristic,
        );
        assert_eq!(result.key(), FrameworkKey::Undefined);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({"springboot": false, "quarkus": false})
        );
    }

    #[test]
    fn test_extracted_framework_serializes_under_key() {
        let extracted = ExtractedFramework {
            key: FrameworkKey::Undefined,
            params: FrameworkParams {
                port: [9080].into_iter().collect(),
                app_file: None,
                app_name: Some("inventory".to_string()),
            },
        };
        let json = serde_json::to_value(&extracted).unwrap();
        assert_eq!(json["undefined"]["port"], serde_json::json!([9080]));
        assert_eq!(json["undefined"]["app_name"], "inventory");
    }
}
