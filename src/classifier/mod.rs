//! Optional external classification service suggesting base images
//!
//! The service is consulted in two steps: a free-text description of the
//! project is standardized, then the standardized entity is containerized into
//! a list of candidate images. Any failure degrades to "no candidates".

mod http;

pub use http::{HttpClassifier, MAX_RETRIES};

use crate::diagnostics::{Diagnostics, Stage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed response from {url}: {message}")]
    Malformed { url: String, message: String },
}

/// Free-text description of one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRequest {
    pub application_name: String,
    pub application_description: String,
    pub technology_summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateImage {
    pub name: String,
    pub url: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait ClassificationService: Send + Sync {
    /// Standardized entities for the described project
    fn standardize(&self, request: &ClassificationRequest) -> Result<Vec<Value>, ClassifierError>;

    /// Candidate images for standardized entities
    fn candidate_images(&self, standardized: &[Value]) -> Result<Vec<CandidateImage>, ClassifierError>;
}

/// Runs both steps; any error is recorded and yields no candidates
pub fn suggest_images(
    service: &dyn ClassificationService,
    request: &ClassificationRequest,
    diagnostics: &mut Diagnostics,
) -> Vec<CandidateImage> {
    let result = service
        .standardize(request)
        .and_then(|standardized| {
            if standardized.is_empty() {
                return Ok(Vec::new());
            }
            service.candidate_images(&standardized)
        });

    match result {
        Ok(images) => {
            debug!(
                application = %request.application_name,
                candidates = images.len(),
                "Classification finished"
            );
            images
        }
        Err(e) => {
            diagnostics.warn(
                Stage::Classifier,
                format!("No image suggestions for {}: {}", request.application_name, e),
            );
            Vec::new()
        }
    }
}

/// `standardized_apps` of a standardize response
pub fn parse_standardized(body: &Value) -> Option<Vec<Value>> {
    body.get("standardized_apps")?.as_array().cloned()
}

/// `Ref Dockers` entries of the first containerization result
pub fn parse_candidates(body: &Value) -> Option<Vec<CandidateImage>> {
    let refs = body
        .get("containerization")?
        .as_array()?
        .first()?
        .get("Ref Dockers")?
        .clone();
    serde_json::from_value(refs).ok()
}
