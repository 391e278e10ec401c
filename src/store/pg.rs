//! Postgres implementation of the record store.
//!
//! Counter and aggregate writes are single `INSERT ... ON CONFLICT DO
//! UPDATE` statements so concurrent requests for the same subject or team
//! never lose increments to a read-then-write race.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use time::Date;
use uuid::Uuid;

use super::{
    ADMITTING_SUBSCRIPTION_STATUSES, CallerIdentity, Membership, RecordStore, Role, StoreError, Subscription, Team,
    WindowCount,
};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn lookup_identity(&self, token: &str) -> Result<Option<CallerIdentity>, StoreError> {
        let row = sqlx::query(
            r"SELECT c.user_id, u.handle
              FROM credentials c
              JOIN users u ON u.id = c.user_id
              WHERE c.token = $1
                AND (c.expires_at IS NULL OR c.expires_at > now())
                AND NOT c.revoked",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| CallerIdentity { user_id: r.get("user_id"), handle: r.get("handle") }))
    }

    async fn find_active_memberships(&self, user_id: Uuid) -> Result<Vec<Membership>, StoreError> {
        let rows = sqlx::query(
            r"SELECT id, team_id, user_id, role, seat_active
              FROM memberships
              WHERE user_id = $1 AND seat_active
              ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Membership {
                id: r.get("id"),
                team_id: r.get("team_id"),
                user_id: r.get("user_id"),
                role: Role::from_db(r.get::<&str, _>("role")),
                seat_active: r.get("seat_active"),
            })
            .collect())
    }

    async fn find_team(&self, team_id: Uuid) -> Result<Option<Team>, StoreError> {
        let row = sqlx::query("SELECT id, name, owner_user_id FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Team { id: r.get("id"), name: r.get("name"), owner_user_id: r.get("owner_user_id") }))
    }

    async fn find_active_subscription(&self, team_id: Uuid) -> Result<Option<Subscription>, StoreError> {
        let statuses: Vec<String> = ADMITTING_SUBSCRIPTION_STATUSES
            .iter()
            .map(ToString::to_string)
            .collect();
        let row = sqlx::query(
            r"SELECT id, team_id, status, seats_allowed, current_period_end
              FROM subscriptions
              WHERE team_id = $1 AND status = ANY($2)
              ORDER BY current_period_end DESC
              LIMIT 1",
        )
        .bind(team_id)
        .bind(&statuses)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Subscription {
            id: r.get("id"),
            team_id: r.get("team_id"),
            status: r.get("status"),
            seats_allowed: r.get("seats_allowed"),
            current_period_end: r.get("current_period_end"),
        }))
    }

    async fn count_active_memberships(&self, team_id: Uuid) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS seats FROM memberships WHERE team_id = $1 AND seat_active")
            .bind(team_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("seats"))
    }

    async fn increment_window_counter(&self, subject_id: Uuid, window_start_ms: i64) -> Result<WindowCount, StoreError> {
        let row = sqlx::query(
            r"INSERT INTO rate_windows (subject_id, window_start_ms, count)
              VALUES ($1, $2, 1)
              ON CONFLICT (subject_id, window_start_ms)
              DO UPDATE SET count = rate_windows.count + 1
              RETURNING count",
        )
        .bind(subject_id)
        .bind(window_start_ms)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.get("count");
        Ok(WindowCount { count, created: count == 1 })
    }

    async fn upsert_usage(
        &self,
        team_id: Uuid,
        usage_date: Date,
        tokens_delta: i64,
        requests_delta: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO usage_aggregates (team_id, usage_date, tokens_used, requests_count)
              VALUES ($1, $2, $3, $4)
              ON CONFLICT (team_id, usage_date)
              DO UPDATE SET tokens_used = usage_aggregates.tokens_used + EXCLUDED.tokens_used,
                            requests_count = usage_aggregates.requests_count + EXCLUDED.requests_count",
        )
        .bind(team_id)
        .bind(usage_date)
        .bind(tokens_delta)
        .bind(requests_delta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
