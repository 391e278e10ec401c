//! Upstream completion client.
//!
//! DESIGN
//! ======
//! Thin HTTP wrapper around the external generation endpoint: exactly one
//! POST per call, a hard request deadline enforced by the HTTP client, and
//! pure parsing in `parse_response` for testability. Generation parameters
//! (temperature, max output tokens) are compile-time constants — callers
//! cannot tune them. Retry policy deliberately does not exist here or in the
//! orchestrator: one attempt, then the caller sees the typed failure.

pub mod config;
pub mod types;

use std::time::Duration;

use config::UpstreamConfig;
pub use types::Complete;
use types::{Completion, UpstreamError};

/// Sampling temperature sent with every completion request.
const TEMPERATURE: f32 = 0.7;
/// Output token ceiling sent with every completion request.
const MAX_OUTPUT_TOKENS: u32 = 1024;

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for the external completion endpoint.
///
/// Configured from environment variables by [`HttpUpstreamClient::from_env`].
pub struct HttpUpstreamClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout_secs: u64,
}

impl HttpUpstreamClient {
    /// Build an upstream client from environment variables (see
    /// [`UpstreamConfig::from_env`]).
    ///
    /// # Errors
    ///
    /// Returns an error if required config is missing or the HTTP client
    /// fails to build.
    pub fn from_env() -> Result<Self, UpstreamError> {
        let config = UpstreamConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an upstream client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| UpstreamError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: config.endpoint,
            api_key: config.api_key,
            timeout_secs: config.timeouts.request_secs,
        })
    }

    /// Return the configured endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport_error(&self, e: &reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout { timeout_secs: self.timeout_secs }
        } else {
            UpstreamError::Request(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl Complete for HttpUpstreamClient {
    async fn complete(&self, prompt: &str) -> Result<Completion, UpstreamError> {
        let body = ApiRequest { prompt, temperature: TEMPERATURE, max_output_tokens: MAX_OUTPUT_TOKENS };

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        if status != 200 {
            return Err(UpstreamError::Api { status, body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    prompt: &'a str,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    text: String,
    total_tokens: Option<u64>,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<Completion, UpstreamError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| UpstreamError::Parse(e.to_string()))?;
    Ok(Completion { text: api.text, total_tokens: api.total_tokens })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
