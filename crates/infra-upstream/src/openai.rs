// Text Completion CompletionClient Implementation

use crate::http::{build_client, require_secret, UpstreamHttpConfig};
use async_trait::async_trait;
use ghprofile_core::error::{AppError, Result};
use ghprofile_core::port::{CompletionClient, SamplingConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo-instruct";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(flatten)]
    sampling: &'a SamplingConfig,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: Option<String>,
}

fn map_reqwest_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::UpstreamGeneration(format!("Completion API timed out: {}", err))
    } else if err.is_decode() {
        AppError::UpstreamGeneration(format!("Malformed completion response: {}", err))
    } else {
        AppError::UpstreamGeneration(format!("Completion request failed: {}", err))
    }
}

/// CompletionClient for the `/v1/completions` endpoint
pub struct OpenAiCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    sampling: SamplingConfig,
}

impl OpenAiCompletionClient {
    /// # Arguments
    ///
    /// * `api_key` - Bearer key; empty is a configuration error
    /// * `base_url` - API root, e.g. `https://api.openai.com`
    /// * `model` - Completion model identifier
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: impl Into<String>,
        http: &UpstreamHttpConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(http)?,
            endpoint: format!("{}/v1/completions", base_url.trim_end_matches('/')),
            api_key: require_secret("OPENAI_API_KEY", api_key)?,
            model: model.into(),
            sampling: SamplingConfig::default(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            sampling: &self.sampling,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %body, "Completion API error");
            return Err(AppError::UpstreamGeneration(format!(
                "Completion API returned {}: {}",
                status, body
            )));
        }

        let body: CompletionResponse = response.json().await.map_err(map_reqwest_error)?;
        debug!(choices = body.choices.len(), "Received completion");

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.text)
            .ok_or_else(|| {
                AppError::UpstreamGeneration("Completion API returned no choices".to_string())
            })
    }
}
