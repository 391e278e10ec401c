//! Record store — the narrow persistence seam the admission pipeline consumes.
//!
//! DESIGN
//! ======
//! Every lookup and counter the pipeline needs is expressed on the
//! [`RecordStore`] trait so handlers never touch SQL directly and tests run
//! against an in-memory mock. The Postgres implementation lives in
//! [`pg::PgStore`]; schema ownership (admin screens, policy definitions)
//! stays outside this service — we read teams, memberships, and
//! subscriptions, and we only ever mutate rate windows and usage aggregates.
//!
//! Both mutating operations are single-statement atomic upserts. The counter
//! increment returns the post-increment count so callers decide admit/deny
//! without a separate read.

use async_trait::async_trait;
use serde::Serialize;
use time::Date;
use uuid::Uuid;

pub mod pg;

/// Subscription statuses that entitle a team to use the service.
pub const ADMITTING_SUBSCRIPTION_STATUSES: [&str; 2] = ["active", "trialing"];

// =============================================================================
// RECORDS
// =============================================================================

/// Verified caller identity produced by credential lookup.
/// Request-scoped; never written back to the store.
#[derive(Debug, Clone, Serialize)]
pub struct CallerIdentity {
    pub user_id: Uuid,
    /// Display handle, when the identity store has one.
    pub handle: Option<String>,
}

/// Billing and isolation unit. Read-only to this service.
#[derive(Debug, Clone, Serialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub owner_user_id: Uuid,
}

/// Membership role. Not consulted by admission decisions; carried for
/// logging and future policy use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Operator,
    Viewer,
}

impl Role {
    /// Parse a stored role string. Unknown values degrade to `Viewer`,
    /// the least-privileged role.
    #[must_use]
    pub fn from_db(raw: &str) -> Self {
        match raw {
            "admin" => Self::Admin,
            "operator" => Self::Operator,
            _ => Self::Viewer,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Operator => "operator",
            Self::Viewer => "viewer",
        }
    }
}

/// A user's seat on a team.
#[derive(Debug, Clone, Serialize)]
pub struct Membership {
    pub id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub seat_active: bool,
}

/// A team's subscription row.
#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub id: Uuid,
    pub team_id: Uuid,
    pub status: String,
    pub seats_allowed: i64,
    pub current_period_end: time::OffsetDateTime,
}

/// Result of an atomic window-counter increment.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WindowCount {
    /// Post-increment count for (subject, window).
    pub count: i64,
    /// `true` when this increment created the window row.
    pub created: bool,
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// TRAIT
// =============================================================================

/// Store operations consumed by the admission pipeline. Async trait so the
/// Postgres implementation and the in-memory test mock are interchangeable.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Exchange a bearer token for a verified identity. `None` means the
    /// token is unknown, expired, or revoked.
    async fn lookup_identity(&self, token: &str) -> Result<Option<CallerIdentity>, StoreError>;

    /// All memberships for the user with `seat_active = true`, ordered by id.
    /// The store invariant is at most one; callers must tolerate more.
    async fn find_active_memberships(&self, user_id: Uuid) -> Result<Vec<Membership>, StoreError>;

    async fn find_team(&self, team_id: Uuid) -> Result<Option<Team>, StoreError>;

    /// The team's subscription with status in
    /// [`ADMITTING_SUBSCRIPTION_STATUSES`], if any.
    async fn find_active_subscription(&self, team_id: Uuid) -> Result<Option<Subscription>, StoreError>;

    async fn count_active_memberships(&self, team_id: Uuid) -> Result<i64, StoreError>;

    /// Atomically increment the fixed-window counter for (subject, window)
    /// and return the post-increment count.
    async fn increment_window_counter(&self, subject_id: Uuid, window_start_ms: i64) -> Result<WindowCount, StoreError>;

    /// Atomically add `tokens_delta`/`requests_delta` to the team's aggregate
    /// for `usage_date`, inserting the row on first use of the day.
    async fn upsert_usage(
        &self,
        team_id: Uuid,
        usage_date: Date,
        tokens_delta: i64,
        requests_delta: i64,
    ) -> Result<(), StoreError>;
}

// =============================================================================
// TEST SUPPORT
// =============================================================================
