use super::{ExternalServer, ServerDetectionResult, ServerParams, ServerSelection, ServerType};
use crate::capture::{CapturedData, FileCategory};
use crate::catalog::{Catalog, JBOSS_DEFAULT, LIBERTY_DEFAULT, TOMCAT_DEFAULT};
use crate::diagnostics::{Diagnostics, Stage};
use crate::fs::FileSystem;
use crate::metadata::Metadata;
use roxmltree::Document;
use std::path::Path;
use tracing::debug;

const LIBERTY_CONFIG_FILE: &str = "server.xml";

/// Resolves the external deploy target, its image and that image's metadata
pub struct ServerParameterExtractor<'a> {
    fs: &'a dyn FileSystem,
    catalog: &'a Catalog,
}

impl<'a> ServerParameterExtractor<'a> {
    pub fn new(fs: &'a dyn FileSystem, catalog: &'a Catalog) -> Self {
        Self { fs, catalog }
    }

    pub fn extract(
        &self,
        detection: &ServerDetectionResult,
        captured: &CapturedData,
        metadata: &Metadata,
        diagnostics: &mut Diagnostics,
    ) -> ServerParams {
        if detection.is_embedded {
            return ServerParams::Embedded;
        }

        let liberty_config = last_liberty_config(captured);
        let (server_type, selection) = match detection.server_type {
            ServerType::Undefined => {
                let fallback = if liberty_config.is_some() {
                    ServerType::Liberty
                } else {
                    ServerType::Jboss
                };
                diagnostics.warn(
                    Stage::Server,
                    format!("No server identified by votes; falling back to {}", fallback),
                );
                (fallback, ServerSelection::ConfigFileFallback)
            }
            voted => (voted, ServerSelection::Voted),
        };

        let java_version = metadata.java_version();
        let compatible_image = self.compatible_image(server_type, java_version);
        debug!(
            server = %server_type,
            java_version,
            image = %compatible_image,
            "Selected server image"
        );

        let config = self.catalog.images.get(server_type, &compatible_image);
        let http_endpoint = match (server_type, liberty_config) {
            (ServerType::Liberty, Some(path)) => self.liberty_http_port(path, diagnostics),
            _ => None,
        };

        ServerParams::External(ExternalServer {
            server_type,
            exposed_ports: config.map(|c| c.exposed_ports()).unwrap_or_default(),
            user: config.and_then(|c| c.user()).map(str::to_string),
            compatible_image,
            http_endpoint,
            selection,
        })
    }

    /// Liberty takes the smallest compatible tag, WildFly the largest
    fn compatible_image(&self, server_type: ServerType, java_version: &str) -> String {
        let picked = match server_type {
            ServerType::Liberty => self.catalog.liberty.smallest(java_version),
            ServerType::Jboss => self.catalog.wildfly.largest(java_version),
            _ => None,
        };

        match (picked, server_type) {
            (Some(tag), _) => tag.to_string(),
            (None, ServerType::Liberty) => LIBERTY_DEFAULT.to_string(),
            (None, ServerType::Jboss) => JBOSS_DEFAULT.to_string(),
            (None, _) => TOMCAT_DEFAULT.to_string(),
        }
    }

    fn liberty_http_port(&self, path: &Path, diagnostics: &mut Diagnostics) -> Option<u16> {
        let content = match self.fs.read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                diagnostics.warn(
                    Stage::Server,
                    format!("Cannot read {}: {}", path.display(), e),
                );
                return None;
            }
        };

        match http_port_from_server_xml(&content) {
            Ok(port) => port,
            Err(e) => {
                diagnostics.warn(
                    Stage::Server,
                    format!("Skipping unparsable {}: {}", path.display(), e),
                );
                None
            }
        }
    }
}

/// Last captured config file named `server.xml`
fn last_liberty_config(captured: &CapturedData) -> Option<&Path> {
    captured
        .files(FileCategory::AppConfig)
        .iter()
        .filter(|p| p.file_name().and_then(|n| n.to_str()) == Some(LIBERTY_CONFIG_FILE))
        .last()
        .map(|p| p.as_path())
}

/// `httpEndpoint/@httpPort` when it is a plain number; `${var}` references are ignored
pub fn http_port_from_server_xml(content: &str) -> Result<Option<u16>, roxmltree::Error> {
    let doc = Document::parse(content)?;
    Ok(doc
        .descendants()
        .filter(|n| n.has_tag_name("httpEndpoint"))
        .filter_map(|n| n.attribute("httpPort"))
        .find_map(|port| port.trim().parse().ok()))
}
