//! Fixed-window rate limiting for admission decisions.
//!
//! DESIGN
//! ======
//! One counter per (subject, window), where the window key is
//! `floor(now_ms / window_ms) * window_ms`. The primary counter lives in the
//! record store as an atomic increment-and-get, shared across instances. A
//! burst straddling a window boundary can admit up to 2x the limit; that
//! approximation is intentional and kept.
//!
//! TRADE-OFFS
//! ==========
//! When the store errors, the limiter never fails the request: it falls back
//! to a process-local counter with the same fixed-window semantics. Separate
//! instances then cannot see each other's traffic, so the effective limit
//! becomes `limit x instance_count` until the store recovers. Availability
//! of the decision is chosen over cross-instance accuracy.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::store::RecordStore;

const DEFAULT_RATE_LIMIT_MAX_REQUESTS: i64 = 30;
const DEFAULT_RATE_LIMIT_WINDOW_MS: i64 = 60_000;

#[derive(Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: i64,
    pub window_ms: i64,
}

impl RateLimitConfig {
    fn from_env() -> Self {
        Self {
            max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS", DEFAULT_RATE_LIMIT_MAX_REQUESTS),
            window_ms: env_parse("RATE_LIMIT_WINDOW_MS", DEFAULT_RATE_LIMIT_WINDOW_MS),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// DECISION
// =============================================================================

/// Outcome of an admission check. Always well-formed — the limiter has no
/// error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Requests left in the current window (0 when denied).
    pub remaining: i64,
    /// When the current window ends, in epoch milliseconds.
    pub reset_at_ms: i64,
    /// Whole seconds until `reset_at_ms`, for the `Retry-After` header.
    /// Always at least 1.
    pub retry_after_secs: u64,
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RecordStore>,
    /// Process-local fallback counters: subject -> current window.
    local: Arc<Mutex<HashMap<Uuid, LocalWindow>>>,
    config: RateLimitConfig,
}

struct LocalWindow {
    window_start_ms: i64,
    count: i64,
}

impl RateLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_config(store, RateLimitConfig::from_env())
    }

    #[must_use]
    pub fn with_config(store: Arc<dyn RecordStore>, config: RateLimitConfig) -> Self {
        Self { store, local: Arc::new(Mutex::new(HashMap::new())), config }
    }

    /// Decide admit/deny for `subject_id` in the current window.
    pub async fn admit(&self, subject_id: Uuid) -> RateDecision {
        self.admit_at(subject_id, now_ms()).await
    }

    /// Internal: admission check with explicit timestamp (for testing).
    async fn admit_at(&self, subject_id: Uuid, now_ms: i64) -> RateDecision {
        let window_start_ms = (now_ms / self.config.window_ms) * self.config.window_ms;

        match self
            .store
            .increment_window_counter(subject_id, window_start_ms)
            .await
        {
            Ok(window) => {
                if window.created {
                    debug!(%subject_id, window_start_ms, "opened rate window");
                }
                self.decision(window.count, window_start_ms, now_ms)
            }
            Err(e) => {
                warn!(error = %e, %subject_id, "rate window store failed — using local fallback");
                self.admit_local(subject_id, window_start_ms, now_ms)
            }
        }
    }

    /// Process-local fallback path. The read-modify-write is atomic per call
    /// under the map mutex.
    fn admit_local(&self, subject_id: Uuid, window_start_ms: i64, now_ms: i64) -> RateDecision {
        let mut local = self.local.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = local
            .entry(subject_id)
            .or_insert(LocalWindow { window_start_ms, count: 0 });
        if entry.window_start_ms != window_start_ms {
            entry.window_start_ms = window_start_ms;
            entry.count = 0;
        }
        entry.count += 1;
        self.decision(entry.count, window_start_ms, now_ms)
    }

    fn decision(&self, count: i64, window_start_ms: i64, now_ms: i64) -> RateDecision {
        let reset_at_ms = window_start_ms + self.config.window_ms;
        let allowed = count <= self.config.max_requests;
        let remaining = if allowed { self.config.max_requests - count } else { 0 };
        let remaining_ms = (reset_at_ms - now_ms).max(0);
        let retry_after_secs = u64::try_from((remaining_ms + 999) / 1000)
            .unwrap_or(1)
            .max(1);
        RateDecision { allowed, remaining, reset_at_ms, retry_after_secs }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
