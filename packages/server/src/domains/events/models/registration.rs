use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{EventId, MemberId, RegistrationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Confirmed,
    Cancelled,
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationStatus::Confirmed => write!(f, "confirmed"),
            RegistrationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A member's seat on an event roster.
///
/// At most one row per (user, event); cancelling and re-registering flips the
/// same row back to confirmed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRegistration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub user_id: MemberId,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    /// `None` until attendance is recorded after the event
    pub attended: Option<bool>,
    pub attended_at: Option<DateTime<Utc>>,
    pub reminder_sent: bool,
    pub updated_at: DateTime<Utc>,
}

/// Confirmed registration whose event starts inside the reminder window
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DueReminder {
    pub registration_id: RegistrationId,
    pub user_id: MemberId,
    pub event_id: EventId,
    pub event_title: String,
    pub starts_at: DateTime<Utc>,
    pub location: Option<String>,
}

impl EventRegistration {
    pub fn is_confirmed(&self) -> bool {
        self.status == RegistrationStatus::Confirmed
    }

    // =========================================================================
    // SQL Queries
    // =========================================================================

    pub async fn find_by_id(id: RegistrationId, pool: &PgPool) -> Result<Option<Self>> {
        let registration =
            sqlx::query_as::<_, EventRegistration>("SELECT * FROM event_registrations WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(registration)
    }

    /// The member's confirmed registration for an event, if any
    pub async fn find_active(
        event_id: EventId,
        user_id: MemberId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let registration = sqlx::query_as::<_, EventRegistration>(
            r#"
            SELECT * FROM event_registrations
            WHERE event_id = $1 AND user_id = $2 AND status = 'confirmed'
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(registration)
    }

    /// Every registration row for an event, confirmed and cancelled
    pub async fn find_for_event(event_id: EventId, pool: &PgPool) -> Result<Vec<Self>> {
        let registrations = sqlx::query_as::<_, EventRegistration>(
            "SELECT * FROM event_registrations WHERE event_id = $1 ORDER BY registered_at ASC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;
        Ok(registrations)
    }

    pub async fn count_confirmed(event_id: EventId, pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1 AND status = 'confirmed'",
        )
        .bind(event_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Insert a confirmed row, or flip an existing cancelled row back to
    /// confirmed.
    ///
    /// Returns `None` if the member already holds a confirmed registration. A
    /// concurrent insert for the same (user, event) waits on the unique index
    /// and then sees the winner's confirmed row.
    pub async fn confirm(
        event_id: EventId,
        user_id: MemberId,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>> {
        let registration = sqlx::query_as::<_, EventRegistration>(
            r#"
            INSERT INTO event_registrations (event_id, user_id, status)
            VALUES ($1, $2, 'confirmed')
            ON CONFLICT (user_id, event_id) DO UPDATE
            SET
                status = 'confirmed',
                cancelled_at = NULL,
                cancellation_reason = NULL,
                updated_at = NOW()
            WHERE event_registrations.status = 'cancelled'
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
        Ok(registration)
    }

    /// confirmed → cancelled. Returns `None` if no confirmed row exists.
    pub async fn cancel_confirmed(
        event_id: EventId,
        user_id: MemberId,
        reason: Option<&str>,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>> {
        let registration = sqlx::query_as::<_, EventRegistration>(
            r#"
            UPDATE event_registrations
            SET
                status = 'cancelled',
                cancelled_at = NOW(),
                cancellation_reason = $3,
                updated_at = NOW()
            WHERE event_id = $1 AND user_id = $2 AND status = 'confirmed'
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(reason)
        .fetch_optional(conn)
        .await?;
        Ok(registration)
    }

    /// Record attendance for a confirmed registration whose event has started.
    ///
    /// Returns `None` when the registration is missing, cancelled, or the event
    /// is still upcoming. Repeating the call overwrites the previous value.
    pub async fn set_attendance(
        id: RegistrationId,
        attended: bool,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let registration = sqlx::query_as::<_, EventRegistration>(
            r#"
            UPDATE event_registrations r
            SET attended = $2, attended_at = NOW(), updated_at = NOW()
            FROM events e
            WHERE r.id = $1
              AND e.id = r.event_id
              AND r.status = 'confirmed'
              AND e.starts_at <= NOW()
            RETURNING r.*
            "#,
        )
        .bind(id)
        .bind(attended)
        .fetch_optional(pool)
        .await?;
        Ok(registration)
    }

    /// Confirmed registrations without a reminder whose published event starts
    /// between now and `until`
    pub async fn find_due_reminders(until: DateTime<Utc>, pool: &PgPool) -> Result<Vec<DueReminder>> {
        let due = sqlx::query_as::<_, DueReminder>(
            r#"
            SELECT
                r.id AS registration_id,
                r.user_id,
                r.event_id,
                e.title AS event_title,
                e.starts_at,
                e.location
            FROM event_registrations r
            JOIN events e ON e.id = r.event_id
            WHERE r.status = 'confirmed'
              AND r.reminder_sent = false
              AND e.status = 'published'
              AND e.starts_at > NOW()
              AND e.starts_at <= $1
            ORDER BY e.starts_at ASC
            "#,
        )
        .bind(until)
        .fetch_all(pool)
        .await?;
        Ok(due)
    }

    /// Flip `reminder_sent` false → true. Returns false if another sweeper
    /// already claimed it or the registration is no longer confirmed.
    pub async fn claim_reminder(id: RegistrationId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE event_registrations
            SET reminder_sent = true, updated_at = NOW()
            WHERE id = $1 AND reminder_sent = false AND status = 'confirmed'
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
