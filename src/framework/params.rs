use super::{ExtractedFramework, Framework, FrameworkKey, FrameworkParams, FrameworkRegistry, FrameworkResult};
use crate::capture::{BuildType, CapturedData, FileCategory};
use crate::diagnostics::{Diagnostics, Stage};
use crate::fs::FileSystem;
use crate::maven::PomDocument;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Categories the free-text port scan reads
const HEURISTIC_CATEGORIES: &[FileCategory] = &[
    FileCategory::AppConfig,
    FileCategory::ApplicationProperties,
    FileCategory::ApplicationYml,
    FileCategory::MavenBuild,
    FileCategory::GradleBuild,
];

fn four_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}").expect("valid regex"))
}

/// Picks the extractor matching the detection outcome
pub fn extract_framework_params(
    result: &FrameworkResult,
    registry: &FrameworkRegistry,
    fs: &dyn FileSystem,
    captured: &CapturedData,
    basename: &str,
    diagnostics: &mut Diagnostics,
) -> ExtractedFramework {
    let framework = result.detected().and_then(|id| registry.get(id));

    match framework {
        Some(fw) => ExtractedFramework {
            key: FrameworkKey::Detected(fw.id()),
            params: FrameworkParameterExtractor::new(fs, basename).extract(
                fw.as_ref(),
                captured,
                diagnostics,
            ),
        },
        None => ExtractedFramework {
            key: FrameworkKey::Undefined,
            params: HeuristicParameterExtractor::new(fs, basename).extract(captured, diagnostics),
        },
    }
}

/// Reads port, artifact name and app name for a confirmed framework
pub struct FrameworkParameterExtractor<'a> {
    fs: &'a dyn FileSystem,
    basename: &'a str,
}

impl<'a> FrameworkParameterExtractor<'a> {
    pub fn new(fs: &'a dyn FileSystem, basename: &'a str) -> Self {
        Self { fs, basename }
    }

    pub fn extract(
        &self,
        framework: &dyn Framework,
        captured: &CapturedData,
        diagnostics: &mut Diagnostics,
    ) -> FrameworkParams {
        let mut port = BTreeSet::new();
        let yaml_path = framework.yaml_port_path();

        for path in captured.files(FileCategory::ApplicationYml) {
            if let Some(content) = self.read(path, diagnostics) {
                match yaml_ports(&content, &yaml_path) {
                    Ok(found) => port.extend(found),
                    Err(e) => diagnostics.warn(
                        Stage::Framework,
                        format!("Skipping unparsable YAML {}: {}", path.display(), e),
                    ),
                }
            }
        }

        for path in captured.files(FileCategory::ApplicationProperties) {
            if let Some(content) = self.read(path, diagnostics) {
                port.extend(properties_ports(&content));
            }
        }

        if port.is_empty() {
            debug!(framework = %framework.id(), "No configured port, using framework default");
            port.extend(framework.default_ports());
        }

        FrameworkParams {
            port,
            app_file: self.app_file(captured, diagnostics),
            app_name: Some(self.basename.to_string()),
        }
    }

    fn app_file(&self, captured: &CapturedData, diagnostics: &mut Diagnostics) -> Option<String> {
        if captured.build_type() != BuildType::Maven {
            return None;
        }
        let path = captured.primary_maven_descriptor()?;
        match PomDocument::load(self.fs, path) {
            Ok(pom) => pom.generated_app_file(),
            Err(e) => {
                diagnostics.warn(
                    Stage::Framework,
                    format!("Cannot derive app file from {}: {}", path.display(), e),
                );
                None
            }
        }
    }

    fn read(&self, path: &Path, diagnostics: &mut Diagnostics) -> Option<String> {
        read_or_warn(self.fs, path, diagnostics)
    }
}

/// Scans raw config and build files for 4-digit numbers on lines that
/// mention `port`. Used when no framework was detected.
pub struct HeuristicParameterExtractor<'a> {
    fs: &'a dyn FileSystem,
    basename: &'a str,
}

impl<'a> HeuristicParameterExtractor<'a> {
    pub fn new(fs: &'a dyn FileSystem, basename: &'a str) -> Self {
        Self { fs, basename }
    }

    pub fn extract(&self, captured: &CapturedData, diagnostics: &mut Diagnostics) -> FrameworkParams {
        let mut seen: HashSet<&PathBuf> = HashSet::new();
        let mut port = BTreeSet::new();

        for category in HEURISTIC_CATEGORIES {
            for path in captured.files(*category) {
                if !seen.insert(path) {
                    continue;
                }
                if let Some(content) = read_or_warn(self.fs, path, diagnostics) {
                    port.extend(scan_port_candidates(&content));
                }
            }
        }

        debug!(candidates = ?port, "Heuristic port scan finished");

        FrameworkParams {
            port,
            app_file: None,
            app_name: Some(self.basename.to_string()),
        }
    }
}

fn read_or_warn(fs: &dyn FileSystem, path: &Path, diagnostics: &mut Diagnostics) -> Option<String> {
    match fs.read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            diagnostics.warn(
                Stage::Framework,
                format!("Skipping unreadable file {}: {}", path.display(), e),
            );
            None
        }
    }
}

/// Ports at `path` in every document of a YAML stream
pub fn yaml_ports(content: &str, path: &[&str]) -> Result<Vec<u16>, serde_yaml::Error> {
    let mut ports = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document)?;
        let mut node = Some(&value);
        for segment in path {
            node = node.and_then(|n| n.get(*segment));
        }
        if let Some(port) = node.and_then(port_value) {
            ports.push(port);
        }
    }

    Ok(ports)
}

fn port_value(value: &serde_yaml::Value) -> Option<u16> {
    match value {
        serde_yaml::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        serde_yaml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Ports from `key=value` lines whose key has a `port` segment, e.g. `server.port=9090`
pub fn properties_ports(content: &str) -> Vec<u16> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| line.split_once('='))
        .filter(|(key, _)| key.trim().split('.').any(|segment| segment == "port"))
        .filter_map(|(_, value)| value.trim().parse().ok())
        .collect()
}

/// Every run of four digits on lines containing `port`
pub fn scan_port_candidates(content: &str) -> Vec<u16> {
    content
        .lines()
        .filter(|line| line.contains("port"))
        .flat_map(|line| four_digits().find_iter(line))
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}
