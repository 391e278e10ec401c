//! Usage accounting — best-effort daily token/request counters.
//!
//! ERROR HANDLING
//! ==============
//! This is the one component whose failures are absorbed: whether the user
//! got served is decided before accounting runs, and a billing write must
//! never change that outcome. Failures are logged and dropped. Do not copy
//! this swallow-everything contract anywhere else.

use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::store::RecordStore;

/// Record `tokens` against the team's aggregate for today (UTC).
/// No-op when `tokens` is zero. Never raises.
pub async fn record_usage(store: &dyn RecordStore, team_id: Uuid, tokens: u64) {
    if tokens == 0 {
        return;
    }
    let today = OffsetDateTime::now_utc().date();
    let tokens_delta = i64::try_from(tokens).unwrap_or(i64::MAX);
    if let Err(e) = store.upsert_usage(team_id, today, tokens_delta, 1).await {
        warn!(error = %e, %team_id, tokens, "usage accounting failed; response already determined");
    }
}

#[cfg(test)]
#[path = "usage_test.rs"]
mod tests;
