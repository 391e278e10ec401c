//! Request pipeline — the admission-and-accounting orchestrator.
//!
//! DESIGN
//! ======
//! Strictly sequential, short-circuiting on the first typed failure:
//! validate -> verify credential -> resolve entitlement -> rate limit ->
//! build prompt -> upstream call -> usage accounting. Validation runs before
//! any I/O; rate-limit denial aborts before the upstream call; usage
//! accounting runs after the response is already determined and can never
//! change it. Nothing here retries — the upstream call is single-attempt by
//! contract, and the rate limiter's store fallback is internal to it.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::upstream::types::UpstreamError;

use super::{entitlement, identity, prompt, usage};

/// Upper bound on transcript length per request.
pub const MAX_MESSAGES: usize = 30;

// =============================================================================
// WIRE TYPES
// =============================================================================

/// One transcript entry from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub author: Option<String>,
    pub text: String,
}

/// Inbound request body for `POST /api/reply`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRequest {
    pub messages: Vec<ChatMessage>,
    pub tone: String,
    #[serde(default)]
    pub length: Option<String>,
}

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub reply: String,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Structural validation of the inbound payload. No I/O.
///
/// # Errors
///
/// `InvalidRequest` naming the offending field.
pub fn validate(req: &ReplyRequest) -> Result<(), ApiError> {
    if req.messages.is_empty() {
        return Err(ApiError::InvalidRequest("messages must not be empty".into()));
    }
    if req.messages.len() > MAX_MESSAGES {
        return Err(ApiError::InvalidRequest(format!("too many messages (max {MAX_MESSAGES})")));
    }
    for (index, message) in req.messages.iter().enumerate() {
        if prompt::sanitize(&message.text).is_empty() {
            return Err(ApiError::InvalidRequest(format!("message {index} has no text")));
        }
    }
    if prompt::sanitize(&req.tone).is_empty() {
        return Err(ApiError::InvalidRequest("tone must not be empty".into()));
    }
    Ok(())
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Run one request through the full admission pipeline.
///
/// # Errors
///
/// The first [`ApiError`] produced by any stage; see the error taxonomy.
pub async fn handle_reply(
    state: &AppState,
    auth_header: Option<&str>,
    req: &ReplyRequest,
) -> Result<ReplyResponse, ApiError> {
    validate(req)?;

    let token = identity::extract_bearer(auth_header)?;
    let caller = identity::verify(state.store.as_ref(), token).await?;

    let context = entitlement::resolve(state.store.as_ref(), &caller).await?;

    let decision = state.rate_limiter.admit(caller.user_id).await;
    if !decision.allowed {
        info!(user_id = %caller.user_id, team_id = %context.team.id, "request rate limited");
        return Err(ApiError::RateLimited { retry_after_secs: decision.retry_after_secs });
    }

    let prompt_text = prompt::build_prompt(req);
    let completion = state.upstream.complete(&prompt_text).await?;
    if completion.text.trim().is_empty() {
        return Err(ApiError::Upstream(UpstreamError::EmptyReply));
    }

    let tokens = completion.total_tokens.unwrap_or(0);
    usage::record_usage(state.store.as_ref(), context.team.id, tokens).await;

    info!(
        user_id = %caller.user_id,
        team_id = %context.team.id,
        tokens,
        remaining = decision.remaining,
        "reply served"
    );

    Ok(ReplyResponse { reply: completion.text })
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
