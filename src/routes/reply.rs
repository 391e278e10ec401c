//! Reply route — HTTP shell around the admission pipeline.
//!
//! The handler only adapts HTTP to the pipeline: pull the Authorization
//! header, surface body-parse rejections as the JSON error shape, and let
//! [`ApiError`]'s `IntoResponse` do the status/header mapping.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::services::pipeline::{self, ReplyRequest};
use crate::state::AppState;

/// `POST /api/reply` — run one request through the admission pipeline.
pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ReplyRequest>, JsonRejection>,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return ApiError::InvalidJson(rejection.body_text()).into_response(),
    };

    match pipeline::handle_reply(&state, auth, &request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
#[path = "reply_test.rs"]
mod tests;
