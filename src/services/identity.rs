//! Identity verification — bearer credential to verified caller.
//!
//! Header parsing happens before any I/O; verification itself is a single
//! identity-store lookup. No side effects, safe to call concurrently.

use crate::error::ApiError;
use crate::store::{CallerIdentity, RecordStore};

/// Extract the bearer token from an `Authorization` header value.
///
/// # Errors
///
/// `MissingCredential` when the header is absent, uses a different scheme,
/// or carries an empty token.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, ApiError> {
    let token = header
        .and_then(|raw| raw.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(ApiError::MissingCredential)?;
    if token.is_empty() {
        return Err(ApiError::MissingCredential);
    }
    Ok(token)
}

/// Exchange a bearer token for a verified identity.
///
/// # Errors
///
/// `InvalidCredential` when the token is unknown, expired, or revoked;
/// `Store` when the identity store itself is unreachable.
pub async fn verify(store: &dyn RecordStore, token: &str) -> Result<CallerIdentity, ApiError> {
    match store.lookup_identity(token).await? {
        Some(identity) => Ok(identity),
        None => Err(ApiError::InvalidCredential),
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
