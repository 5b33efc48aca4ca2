use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

use crate::common::{Id, MemberId};

/// Submission status - `pending` until an admin resolves it, then terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "submission_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Pending => write!(f, "pending"),
            SubmissionStatus::Approved => write!(f, "approved"),
            SubmissionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(SubmissionStatus::Pending),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid submission status: {}", s)),
        }
    }
}

/// Moderation columns shared by every submission table.
///
/// `status == Pending` exactly when `moderated_by` and `moderated_at` are null;
/// a rejected record always carries its reason. The tables enforce both with
/// CHECK constraints.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModerationState {
    pub status: SubmissionStatus,
    pub moderated_by: Option<MemberId>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

/// An admin's resolution of a pending submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationDecision {
    Approve,
    Reject { reason: String },
}

impl ModerationDecision {
    pub fn target_status(&self) -> SubmissionStatus {
        match self {
            ModerationDecision::Approve => SubmissionStatus::Approved,
            ModerationDecision::Reject { .. } => SubmissionStatus::Rejected,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ModerationDecision::Approve => None,
            ModerationDecision::Reject { reason } => Some(reason),
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            ModerationDecision::Approve => "approve",
            ModerationDecision::Reject { .. } => "reject",
        }
    }
}

/// A record that goes through pending → approved | rejected moderation.
///
/// Implementors supply their table, the "go live" assignments applied on
/// approval, and a few accessors; the SQL for reading, resolving and deleting is
/// shared. `resolve_if_pending` is a single conditional UPDATE guarded by
/// `status = 'pending'`, so of any number of concurrent resolutions exactly one
/// matches the row.
#[async_trait]
pub trait Moderatable:
    for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + Sized + 'static
{
    /// Entity marker for this submission's typed id
    type Marker: Send + Sync + 'static;

    /// Lowercase entity name used in errors, logs and notification payloads
    const ENTITY: &'static str;

    /// Table holding the submission rows
    const TABLE: &'static str;

    /// Extra `SET` assignments, evaluated in the same UPDATE. `$2` is the target
    /// status, so assignments can key off `$2 = 'approved'`.
    const GO_LIVE_SQL: &'static str;

    fn id(&self) -> Id<Self::Marker>;
    fn submitted_by(&self) -> MemberId;
    fn title(&self) -> &str;
    fn moderation(&self) -> &ModerationState;

    async fn find_by_id(id: Id<Self::Marker>, pool: &PgPool) -> Result<Option<Self>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", Self::TABLE);
        let record = sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(record)
    }

    /// Find submissions awaiting moderation (oldest first)
    async fn find_pending(pool: &PgPool) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT * FROM {} WHERE status = 'pending' ORDER BY created_at ASC",
            Self::TABLE
        );
        let records = sqlx::query_as::<_, Self>(&sql).fetch_all(pool).await?;
        Ok(records)
    }

    /// Apply the decision iff the row is still pending.
    ///
    /// Returns `None` when the row is missing or already resolved.
    async fn resolve_if_pending(
        id: Id<Self::Marker>,
        moderated_by: MemberId,
        decision: &ModerationDecision,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let sql = format!(
            r#"
            UPDATE {table}
            SET
                status = $2,
                moderated_by = $3,
                moderated_at = NOW(),
                rejection_reason = $4,
                updated_at = NOW(){go_live}
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
            table = Self::TABLE,
            go_live = Self::GO_LIVE_SQL,
        );

        let record = sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .bind(decision.target_status())
            .bind(moderated_by)
            .bind(decision.reason())
            .fetch_optional(pool)
            .await?;
        Ok(record)
    }

    /// Remove a submission regardless of status. Returns whether a row was deleted.
    async fn delete(id: Id<Self::Marker>, pool: &PgPool) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", Self::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
