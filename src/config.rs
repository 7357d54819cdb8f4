//! Configuration management for segbox
//!
//! Settings are loaded from environment variables with defaults; CLI flags
//! override them afterwards.
//!
//! # Environment Variables
//!
//! - `SEGBOX_CATALOG_PATH`: JSON catalog replacing the built-in tables - optional
//! - `SEGBOX_CONSOLIDATED_IMAGES_PATH`: consolidated image dump the liberty and
//!   wildfly tables are derived from - optional
//! - `SEGBOX_TEMPLATES_DIR`: directory overriding built-in segment templates - optional
//! - `SEGBOX_CLASSIFIER_URL`: base URL of the classification service - optional
//! - `SEGBOX_REQUEST_TIMEOUT`: classifier timeout in seconds - default: "5"
//! - `SEGBOX_MAX_RETRIES`: classifier retries per request - default: "1"
//! - `SEGBOX_BATCH_CONCURRENCY`: projects processed at once - default: "4"
//! - `SEGBOX_LOG_LEVEL`: logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use segbox::{RealFileSystem, SegboxConfig};
//!
//! let config = SegboxConfig::default();
//! config.validate().expect("Invalid configuration");
//! let catalog = config.load_catalog(&RealFileSystem::new()).expect("catalog");
//! ```

use crate::catalog::{Catalog, CatalogError, ConsolidatedImages};
use crate::classifier::{ClassificationService, ClassifierError, HttpClassifier};
use crate::fs::FileSystem;
use crate::segments::SegmentTemplates;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MAX_RETRIES: u32 = 1;
const DEFAULT_BATCH_CONCURRENCY: usize = 4;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_RETRIES_LIMIT: u32 = crate::classifier::MAX_RETRIES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Classifier initialization failed: {0}")]
    Classifier(#[from] ClassifierError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegboxConfig {
    pub catalog_path: Option<PathBuf>,
    pub consolidated_images_path: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
    pub classifier_url: Option<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub batch_concurrency: usize,
    pub log_level: String,
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key).ok().filter(|v| !v.is_empty()).map(PathBuf::from)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl Default for SegboxConfig {
    /// Loads from `SEGBOX_*` environment variables; unparsable values fall back to defaults
    fn default() -> Self {
        Self {
            catalog_path: env_path("SEGBOX_CATALOG_PATH"),
            consolidated_images_path: env_path("SEGBOX_CONSOLIDATED_IMAGES_PATH"),
            templates_dir: env_path("SEGBOX_TEMPLATES_DIR"),
            classifier_url: env::var("SEGBOX_CLASSIFIER_URL")
                .ok()
                .filter(|v| !v.is_empty()),
            request_timeout_secs: env_parsed("SEGBOX_REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retries: env_parsed("SEGBOX_MAX_RETRIES", DEFAULT_MAX_RETRIES),
            batch_concurrency: env_parsed("SEGBOX_BATCH_CONCURRENCY", DEFAULT_BATCH_CONCURRENCY),
            log_level: env::var("SEGBOX_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
                .to_lowercase(),
        }
    }
}

impl SegboxConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(format!(
                "Request timeout cannot exceed {} seconds",
                MAX_REQUEST_TIMEOUT_SECS
            )));
        }

        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::ValidationFailed(format!(
                "Max retries cannot exceed {}",
                MAX_RETRIES_LIMIT
            )));
        }

        if self.batch_concurrency == 0 {
            return Err(ConfigError::ValidationFailed(
                "Batch concurrency must be at least 1".to_string(),
            ));
        }

        if let Some(url) = &self.classifier_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ParseError {
                    field: "SEGBOX_CLASSIFIER_URL".to_string(),
                    error: format!("'{}' is not an http(s) URL", url),
                });
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Built-in or file catalog, refreshed from the consolidated image dump when configured
    pub fn load_catalog(&self, fs: &dyn FileSystem) -> Result<Catalog, ConfigError> {
        let catalog = match &self.catalog_path {
            Some(path) => Catalog::load(fs, path)?,
            None => Catalog::builtin(),
        };

        match &self.consolidated_images_path {
            Some(path) => {
                let consolidated = load_consolidated(fs, path)?;
                info!(path = %path.display(), families = consolidated.len(), "Applying consolidated images");
                Ok(catalog.with_consolidated(&consolidated))
            }
            None => Ok(catalog),
        }
    }

    pub fn load_templates(&self, fs: &dyn FileSystem) -> SegmentTemplates {
        match &self.templates_dir {
            Some(dir) => SegmentTemplates::with_overrides(fs, dir),
            None => SegmentTemplates::builtin(),
        }
    }

    /// HTTP classifier when a URL is configured.
    ///
    /// The client is blocking; create and drop it outside async contexts.
    pub fn classifier(&self) -> Result<Option<Arc<dyn ClassificationService>>, ConfigError> {
        let Some(url) = &self.classifier_url else {
            return Ok(None);
        };
        let client = HttpClassifier::new(
            url,
            Duration::from_secs(self.request_timeout_secs),
            self.max_retries,
        )?;
        Ok(Some(Arc::new(client)))
    }

    pub fn to_display_map(&self) -> std::collections::BTreeMap<String, String> {
        let mut map = std::collections::BTreeMap::new();
        let path = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "builtin".to_string())
        };

        map.insert("catalog_path".to_string(), path(&self.catalog_path));
        map.insert(
            "consolidated_images_path".to_string(),
            path(&self.consolidated_images_path),
        );
        map.insert("templates_dir".to_string(), path(&self.templates_dir));
        map.insert(
            "classifier_url".to_string(),
            self.classifier_url.clone().unwrap_or_else(|| "disabled".to_string()),
        );
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert("max_retries".to_string(), self.max_retries.to_string());
        map.insert(
            "batch_concurrency".to_string(),
            self.batch_concurrency.to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());
        map
    }
}

fn load_consolidated(fs: &dyn FileSystem, path: &Path) -> Result<ConsolidatedImages, CatalogError> {
    let content = fs.read_to_string(path).map_err(|e| CatalogError::Read {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    })?;
    Ok(serde_json::from_str(&content)?)
}

impl fmt::Display for SegboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Segbox Configuration:")?;
        for (key, value) in self.to_display_map() {
            writeln!(f, "  {}: {}", key, value)?;
        }
        Ok(())
    }
}
