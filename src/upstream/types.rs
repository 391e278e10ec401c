//! Upstream types — completion result, errors, and the client trait.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by upstream completion calls.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// A required configuration value is missing or malformed.
    #[error("upstream config: {0}")]
    Config(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The HTTP request to the upstream endpoint failed before a response.
    #[error("upstream request failed: {0}")]
    Request(String),

    /// No response arrived within the configured deadline; the in-flight
    /// call was cancelled.
    #[error("upstream call timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The upstream endpoint returned a non-success HTTP status.
    #[error("upstream response error: status {status}")]
    Api { status: u16, body: String },

    /// The upstream response body could not be deserialized.
    #[error("upstream response parse failed: {0}")]
    Parse(String),

    /// The call succeeded but carried no usable reply text.
    #[error("upstream returned an empty reply")]
    EmptyReply,
}

impl UpstreamError {
    /// Whether a caller may reasonably retry later.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::Request(_) | Self::Timeout { .. } | Self::Api { .. } | Self::Parse(_) | Self::EmptyReply
        )
    }
}

// =============================================================================
// COMPLETION
// =============================================================================

/// Result of a single completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    /// Total tokens billed by the upstream provider, when reported.
    pub total_tokens: Option<u64>,
}

// =============================================================================
// CLIENT TRAIT
// =============================================================================

/// Provider-neutral async trait for text completion. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Complete: Send + Sync {
    /// Send exactly one completion request for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] if the request fails, times out, or the
    /// response is malformed. Never retries.
    async fn complete(&self, prompt: &str) -> Result<Completion, UpstreamError>;
}

// =============================================================================
// TEST SUPPORT
// =============================================================================
