use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use typed_builder::TypedBuilder;

use crate::common::{EventId, MemberId};

/// Event status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
    Completed,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Draft => write!(f, "draft"),
            EventStatus::Published => write!(f, "published"),
            EventStatus::Cancelled => write!(f, "cancelled"),
            EventStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Community event with a fixed number of seats.
///
/// `registered_count` caches the number of confirmed registrations and is only
/// ever changed in the same transaction that flips a registration row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: EventId,
    pub organizer_id: MemberId,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: i32,
    pub registered_count: i32,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct NewEvent {
    pub organizer_id: MemberId,
    #[builder(setter(into))]
    pub title: String,
    #[builder(setter(into))]
    pub description: String,
    #[builder(default, setter(strip_option, into))]
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    #[builder(default, setter(strip_option))]
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: i32,
}

impl Event {
    /// Registration is allowed only while published and before the start time
    pub fn is_open_for_registration(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Published && self.starts_at > now
    }

    // =========================================================================
    // SQL Queries
    // =========================================================================

    /// Create a new event (starts as draft)
    pub async fn create(input: NewEvent, pool: &PgPool) -> Result<Self> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (organizer_id, title, description, location, starts_at, ends_at, capacity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.organizer_id)
        .bind(input.title)
        .bind(input.description)
        .bind(input.location)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.capacity)
        .fetch_one(pool)
        .await?;
        Ok(event)
    }

    pub async fn find_by_id(id: EventId, pool: &PgPool) -> Result<Option<Self>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(event)
    }

    /// Read the event inside an open transaction
    pub async fn find_by_id_in(id: EventId, conn: &mut PgConnection) -> Result<Option<Self>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(event)
    }

    /// draft → published
    pub async fn publish(id: EventId, pool: &PgPool) -> Result<Option<Self>> {
        Self::transition(id, EventStatus::Published, "status = 'draft'", pool).await
    }

    /// draft | published → cancelled
    pub async fn cancel(id: EventId, pool: &PgPool) -> Result<Option<Self>> {
        Self::transition(
            id,
            EventStatus::Cancelled,
            "status IN ('draft', 'published')",
            pool,
        )
        .await
    }

    /// published → completed
    pub async fn complete(id: EventId, pool: &PgPool) -> Result<Option<Self>> {
        Self::transition(id, EventStatus::Completed, "status = 'published'", pool).await
    }

    async fn transition(
        id: EventId,
        to: EventStatus,
        from_guard: &'static str,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let sql = format!(
            "UPDATE events SET status = $2, updated_at = NOW() WHERE id = $1 AND {} RETURNING *",
            from_guard
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(to)
            .fetch_optional(pool)
            .await?;
        Ok(event)
    }

    /// Take one seat if the event is open and not full.
    ///
    /// Single guarded increment: concurrent callers serialize on the event row
    /// and each re-checks `registered_count < capacity` against the latest
    /// committed value. Returns the new count, or `None` if the guard failed.
    pub async fn take_seat(id: EventId, conn: &mut PgConnection) -> Result<Option<i32>> {
        let count = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE events
            SET registered_count = registered_count + 1, updated_at = NOW()
            WHERE id = $1
              AND status = 'published'
              AND starts_at > NOW()
              AND registered_count < capacity
            RETURNING registered_count
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(count)
    }

    /// Give one seat back. Returns `None` if the count is already zero.
    pub async fn release_seat(id: EventId, conn: &mut PgConnection) -> Result<Option<i32>> {
        let count = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE events
            SET registered_count = registered_count - 1, updated_at = NOW()
            WHERE id = $1 AND registered_count > 0
            RETURNING registered_count
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(count)
    }

    /// Recompute `registered_count` from the confirmed registration rows.
    ///
    /// Locks the event row first, so every register/cancel transaction that
    /// already touched the counter has committed before the COUNT runs, and any
    /// that has not yet will apply its +1/-1 on top of the recomputed value.
    pub async fn reconcile_registered_count(
        id: EventId,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>> {
        let locked = sqlx::query_scalar::<_, i32>(
            "SELECT registered_count FROM events WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        if locked.is_none() {
            return Ok(None);
        }

        let confirmed = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1 AND status = 'confirmed'",
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET registered_count = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(i32::try_from(confirmed)?)
        .fetch_one(&mut *conn)
        .await?;
        Ok(Some(event))
    }
}
