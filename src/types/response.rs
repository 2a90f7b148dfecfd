// src/types/response.rs
use serde::{Deserialize, Serialize};

/// Error body returned by the service on any non-success status.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Parse a failure body; anything that is not the expected JSON shape
    /// yields no detail.
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// The detail message when it is a non-empty string.
    pub fn message(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(|d| d.as_str())
            .filter(|d| !d.trim().is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct RewriteRequest<'a> {
    pub bullets: &'a [String],
    pub jd_text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct DocumentRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
