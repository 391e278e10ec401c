//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. All
//! dependencies are constructed once at startup and shared as read-only
//! handles; per-request data never lives here. The store and upstream client
//! sit behind traits so tests swap in mocks.

use std::sync::Arc;

use crate::rate_limit::RateLimiter;
use crate::store::RecordStore;
use crate::upstream::Complete;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub upstream: Arc<dyn Complete>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, upstream: Arc<dyn Complete>) -> Self {
        let rate_limiter = RateLimiter::new(Arc::clone(&store));
        Self { store, upstream, rate_limiter }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
