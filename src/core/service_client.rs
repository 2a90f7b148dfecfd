// src/core/service_client.rs
//! HTTP client for the analysis service and its document converter.
//!
//! Every call carries the stored credential in `x-access-code`. Failures are
//! classified here but never acted upon: revoking the credential is up to the
//! caller.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::core::credential_store::CredentialStore;
use crate::error::{ClientError, Result};
use crate::types::response::{DocumentRequest, ErrorResponse, HealthResponse, RewriteRequest};
use crate::types::{AnalysisRequest, AnalysisResult, RewriteResult};

pub const ACCESS_HEADER: &str = "x-access-code";
/// Detail string the service uses for a missing or rejected credential.
pub const AUTH_FAILURE_DETAIL: &str = "Invalid or missing Access Code";

const ANALYZE_ENDPOINT: &str = "/analyze";
const REWRITE_ENDPOINT: &str = "/rewrite";
const DOCUMENT_ENDPOINT: &str = "/download-docx";
const HEALTH_ENDPOINT: &str = "/health";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Analyze,
    Rewrite,
    Document,
}

impl Endpoint {
    fn generic_message(&self) -> &'static str {
        match self {
            Endpoint::Analyze => "Analysis failed",
            Endpoint::Rewrite => "Cover letter generation failed",
            Endpoint::Document => "Failed to download DOCX",
        }
    }

    fn error(&self, message: String) -> ClientError {
        match self {
            Endpoint::Analyze => ClientError::Analysis(message),
            Endpoint::Rewrite => ClientError::Rewrite(message),
            Endpoint::Document => ClientError::Export(message),
        }
    }
}

/// Map a non-success response to an error kind.
///
/// The sentinel detail string and a 401 both mean the credential was not
/// accepted, for every endpoint.
pub fn classify_failure(endpoint: Endpoint, status: u16, body: &str) -> ClientError {
    let parsed = ErrorResponse::parse(body);
    let detail = parsed.message();

    if detail == Some(AUTH_FAILURE_DETAIL) || status == StatusCode::UNAUTHORIZED.as_u16() {
        return ClientError::Auth;
    }

    endpoint.error(
        detail
            .map(str::to_string)
            .unwrap_or_else(|| endpoint.generic_message().to_string()),
    )
}

/// Operations offered by the remote service.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult>;
    async fn rewrite(&self, bullets: &[String], jd_text: &str) -> Result<RewriteResult>;
    async fn export_document(&self, tailored_resume: &str) -> Result<Vec<u8>>;
}

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl ServiceClient {
    pub fn new(
        base_url: String,
        timeout_seconds: u64,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(ACCESS_HEADER, self.credentials.get().unwrap_or_default())
    }

    async fn send(&self, endpoint: Endpoint, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = self.authed(builder).send().await.map_err(|e| {
            error!("Request to {:?} failed: {}", endpoint, e);
            endpoint.error(format!("{}: {}", endpoint.generic_message(), e))
        })?;

        let status = response.status();
        debug!("{:?} response status: {}", endpoint, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = classify_failure(endpoint, status.as_u16(), &body);
        if err.is_auth() {
            info!("Service rejected the access code ({})", status);
        } else {
            error!("Service error {} on {:?}: {}", status, endpoint, body);
        }
        Err(err)
    }

    /// Liveness check; needs no credential.
    pub async fn health(&self) -> anyhow::Result<String> {
        use anyhow::Context;

        let url = self.url(HEALTH_ENDPOINT);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to GET from {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} error from {}", status, url);
        }

        let health: HealthResponse = response
            .json()
            .await
            .context("Failed to parse health response")?;
        Ok(health.status)
    }
}

#[async_trait]
impl AnalysisApi for ServiceClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let url = self.url(ANALYZE_ENDPOINT);
        let content_type = request
            .resume
            .content_type()
            .unwrap_or("application/octet-stream");

        let part = Part::bytes(request.resume.bytes.clone())
            .file_name(request.resume.file_name.clone())
            .mime_str(content_type)
            .map_err(|e| ClientError::Analysis(format!("Failed to create multipart: {}", e)))?;
        let form = Form::new()
            .part("resume_file", part)
            .text("jd_text", request.jd_text.clone());

        info!("Calling analysis service: {}", url);
        let response = self
            .send(Endpoint::Analyze, self.client.post(&url).multipart(form))
            .await?;

        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Analysis(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&text).map_err(|e| {
            error!("Unparseable analysis response: {}", text);
            ClientError::Analysis(format!("Failed to parse analysis response: {}", e))
        })
    }

    async fn rewrite(&self, bullets: &[String], jd_text: &str) -> Result<RewriteResult> {
        let url = self.url(REWRITE_ENDPOINT);
        let payload = RewriteRequest { bullets, jd_text };

        info!("Calling rewrite service: {} ({} bullets)", url, bullets.len());
        let response = self
            .send(Endpoint::Rewrite, self.client.post(&url).json(&payload))
            .await?;

        response
            .json::<RewriteResult>()
            .await
            .map_err(|e| ClientError::Rewrite(format!("Failed to parse rewrite response: {}", e)))
    }

    async fn export_document(&self, tailored_resume: &str) -> Result<Vec<u8>> {
        let url = self.url(DOCUMENT_ENDPOINT);
        let payload = DocumentRequest {
            text: tailored_resume,
        };

        info!("Requesting document conversion: {}", url);
        let response = self
            .send(Endpoint::Document, self.client.post(&url).json(&payload))
            .await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Export(format!("Failed to read document: {}", e)))?;
        Ok(bytes.to_vec())
    }
}
