//! API error taxonomy — one typed failure per pipeline stage, each mapped to
//! a grepable code, an HTTP status, and a retryable flag.
//!
//! DESIGN
//! ======
//! Failures render as `{"error": {"code", "message", "retryable"}}`. Rate
//! limit denials additionally carry a `Retry-After` header. Entitlement and
//! upstream failures keep their own enums (they belong to those components)
//! and fold into [`ApiError`] at the pipeline boundary.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::store::StoreError;
use crate::upstream::types::UpstreamError;

// =============================================================================
// ENTITLEMENT ERRORS
// =============================================================================

/// Why entitlement resolution refused a caller.
#[derive(Debug, thiserror::Error)]
pub enum EntitlementError {
    #[error("no active team membership for user {0}")]
    MembershipMissing(Uuid),
    #[error("team {0} not found")]
    TeamMissing(Uuid),
    #[error("no active subscription for team {0}")]
    SubscriptionInactive(Uuid),
    #[error("seat limit reached for team {team_id} ({seats_used}/{seats_allowed})")]
    SeatLimitReached { team_id: Uuid, seats_used: i64, seats_allowed: i64 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

// =============================================================================
// API ERROR
// =============================================================================

/// Every failure the pipeline can surface to a caller.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid JSON body: {0}")]
    InvalidJson(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("missing bearer credential")]
    MissingCredential,
    #[error("credential rejected")]
    InvalidCredential,
    #[error(transparent)]
    Entitlement(#[from] EntitlementError),
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Grepable error code carried in the response body.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "E_INVALID_JSON",
            Self::InvalidRequest(_) => "E_INVALID_REQUEST",
            Self::MissingCredential => "E_MISSING_CREDENTIAL",
            Self::InvalidCredential => "E_INVALID_CREDENTIAL",
            Self::Entitlement(e) => match e {
                EntitlementError::MembershipMissing(_) => "E_MEMBERSHIP_MISSING",
                EntitlementError::TeamMissing(_) => "E_TEAM_MISSING",
                EntitlementError::SubscriptionInactive(_) => "E_SUBSCRIPTION_INACTIVE",
                EntitlementError::SeatLimitReached { .. } => "E_SEAT_LIMIT",
                EntitlementError::Store(_) => "E_STORE",
            },
            Self::RateLimited { .. } => "E_RATE_LIMITED",
            Self::Upstream(e) => match e {
                UpstreamError::Timeout { .. } => "E_UPSTREAM_TIMEOUT",
                UpstreamError::EmptyReply => "E_EMPTY_REPLY",
                _ => "E_UPSTREAM",
            },
            Self::Store(_) => "E_STORE",
        }
    }

    /// HTTP status class for the failure.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingCredential | Self::InvalidCredential => StatusCode::UNAUTHORIZED,
            Self::Entitlement(EntitlementError::Store(_)) | Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Entitlement(_) => StatusCode::FORBIDDEN,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(UpstreamError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Whether the caller may retry the same request later without changes.
    #[must_use]
    pub fn retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Store(_) | Self::Entitlement(EntitlementError::Store(_)) => true,
            Self::Upstream(e) => e.retryable(),
            _ => false,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retry_after = match &self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };
        let body = serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "retryable": self.retryable(),
            }
        });
        let mut response = (self.status(), Json(body)).into_response();
        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
