use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use anyhow::{Result, anyhow};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::AnalyzeError;
use crate::result::ScoreResult;
use crate::state::AnalyzeRequest;

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

/// HTTP client for the resume scoring service.
#[derive(Clone)]
pub struct ScoringClient {
    client: Client,
    api: ApiConfig,
}

impl ScoringClient {
    pub fn new(api: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            api,
        }
    }

    pub fn base_url(&self) -> String {
        self.api.resolved_base_url()
    }

    pub fn analyze_url(&self) -> String {
        self.api.analyze_url()
    }

    /// Post the resume and role once. No retry, no timeout.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<ScoreResult, AnalyzeError> {
        let url = self.analyze_url();
        info!(
            "Submitting {} ({} bytes) for role {:?} to {} [request {}]",
            request.file.file_name,
            request.file.bytes.len(),
            request.target_role,
            url,
            request.request_id
        );

        let response = self
            .client
            .post(&url)
            .multipart(build_form(request)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|text| !text.trim().is_empty());
            warn!("Scoring service returned {} [request {}]", status, request.request_id);
            return Err(AnalyzeError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let result = ScoreResult::from_json(&body)?;
        info!("Analysis {} finished", request.request_id);
        Ok(result)
    }

    pub async fn check_health(&self) -> Result<String> {
        let url = self.api.health_url();

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Health check failed with status: {}", response.status()));
        }

        let health: HealthResponse = response.json().await?;
        Ok(health.status)
    }
}

/// Multipart body: the resume under `file`, the role under `target_role`.
pub fn build_form(request: &AnalyzeRequest) -> Result<Form, AnalyzeError> {
    let file = Part::bytes(request.file.bytes.clone())
        .file_name(request.file.file_name.clone())
        .mime_str("application/pdf")?;

    Ok(Form::new()
        .part("file", file)
        .text("target_role", request.target_role.clone()))
}
