use super::{parse_candidates, parse_standardized, CandidateImage, ClassificationRequest, ClassificationService, ClassifierError};
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const BACKOFF_BASE_MS: u64 = 250;

/// Upper bound on retries per request
pub const MAX_RETRIES: u32 = 5;

/// Blocking HTTP client for the classification service.
///
/// Transport errors and non-success statuses are retried up to `max_retries`
/// times (capped at [`MAX_RETRIES`]) with exponential backoff; malformed
/// bodies are not retried.
pub struct HttpClassifier {
    base_url: String,
    client: Client,
    max_retries: u32,
}

impl HttpClassifier {
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            max_retries: max_retries.min(MAX_RETRIES),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ClassifierError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            match self.post_once(&url, body) {
                Ok(value) => return Ok(value),
                Err(e @ ClassifierError::Malformed { .. }) => return Err(e),
                Err(e) if attempt >= self.max_retries => return Err(e),
                Err(e) => {
                    let delay = backoff_delay(attempt);
                    warn!(url = %url, attempt, error = %e, delay_ms = delay.as_millis() as u64, "Retrying classification request");
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }

    fn post_once<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Value, ClassifierError> {
        debug!(url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| ClassifierError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().map_err(|e| ClassifierError::Malformed {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    fn malformed(&self, path: &str, message: &str) -> ClassifierError {
        ClassifierError::Malformed {
            url: format!("{}/{}", self.base_url, path),
            message: message.to_string(),
        }
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS.checked_shl(attempt).unwrap_or(u64::MAX))
}

impl ClassificationService for HttpClassifier {
    fn standardize(&self, request: &ClassificationRequest) -> Result<Vec<Value>, ClassifierError> {
        let body = self.post("standardize", std::slice::from_ref(request))?;
        parse_standardized(&body).ok_or_else(|| self.malformed("standardize", "missing standardized_apps"))
    }

    fn candidate_images(&self, standardized: &[Value]) -> Result<Vec<CandidateImage>, ClassifierError> {
        let body = self.post("containerize", standardized)?;
        parse_candidates(&body).ok_or_else(|| self.malformed("containerize", "missing containerization candidates"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::suggest_images;
    use crate::diagnostics::Diagnostics;

    #[test]
    fn test_trailing_slash_trimmed() {
        let classifier = HttpClassifier::new("http://localhost:8000/", Duration::from_secs(1), 0).unwrap();
        assert_eq!(classifier.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_retries_capped() {
        let classifier = HttpClassifier::new("http://localhost:8000", Duration::from_secs(1), u32::MAX).unwrap();
        assert_eq!(classifier.max_retries(), MAX_RETRIES);

        let classifier = HttpClassifier::new("http://localhost:8000", Duration::from_secs(1), 2).unwrap();
        assert_eq!(classifier.max_retries(), 2);
    }

    #[test]
    fn test_backoff_delay_never_overflows() {
        assert_eq!(backoff_delay(0), Duration::from_millis(250));
        assert_eq!(backoff_delay(2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(64), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_unreachable_service_degrades() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let classifier = HttpClassifier::new("http://127.0.0.1:9", Duration::from_millis(200), 0).unwrap();
        let request = ClassificationRequest {
            application_name: "shop".to_string(),
            application_description: String::new(),
            technology_summary: String::new(),
        };

        let mut diags = Diagnostics::new();
        assert!(suggest_images(&classifier, &request, &mut diags).is_empty());
        assert_eq!(diags.len(), 1);
    }
}
