//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One JSON endpoint fronts the whole admission pipeline; everything else
//! (team administration, billing screens) lives in a separate surface that
//! shares only the database. CORS stays permissive because the credential
//! travels in the Authorization header, never in a cookie.

pub mod reply;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/reply", post(reply::handle))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
