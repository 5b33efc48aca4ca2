use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{MemberId, TipId};

/// One member's like on a tip. (tip_id, member_id) is the primary key.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TipLike {
    pub tip_id: TipId,
    pub member_id: MemberId,
    pub created_at: DateTime<Utc>,
}

/// Result of a like-set mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TipLikeOutcome {
    /// false when the member was already in (or already absent from) the set
    pub changed: bool,
    pub like_count: i32,
}

impl TipLike {
    /// Add a member to the tip's like set.
    ///
    /// The membership row and the cached `like_count` change in one transaction.
    /// A concurrent duplicate insert waits on the primary key and then does
    /// nothing, so each (tip, member) pair can increment the count at most once.
    pub async fn add(tip_id: TipId, member_id: MemberId, pool: &PgPool) -> Result<TipLikeOutcome> {
        let mut tx = pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO tip_likes (tip_id, member_id)
            VALUES ($1, $2)
            ON CONFLICT (tip_id, member_id) DO NOTHING
            "#,
        )
        .bind(tip_id)
        .bind(member_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        let like_count = if inserted {
            sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE tips
                SET like_count = like_count + 1
                WHERE id = $1
                RETURNING like_count
                "#,
            )
            .bind(tip_id)
            .fetch_one(&mut *tx)
            .await?
        } else {
            sqlx::query_scalar::<_, i32>("SELECT like_count FROM tips WHERE id = $1")
                .bind(tip_id)
                .fetch_one(&mut *tx)
                .await?
        };

        tx.commit().await?;

        Ok(TipLikeOutcome {
            changed: inserted,
            like_count,
        })
    }

    /// Remove a member from the tip's like set (same transaction shape as `add`).
    pub async fn remove(
        tip_id: TipId,
        member_id: MemberId,
        pool: &PgPool,
    ) -> Result<TipLikeOutcome> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM tip_likes WHERE tip_id = $1 AND member_id = $2")
            .bind(tip_id)
            .bind(member_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            == 1;

        let like_count = if deleted {
            sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE tips
                SET like_count = like_count - 1
                WHERE id = $1
                RETURNING like_count
                "#,
            )
            .bind(tip_id)
            .fetch_one(&mut *tx)
            .await?
        } else {
            sqlx::query_scalar::<_, i32>("SELECT like_count FROM tips WHERE id = $1")
                .bind(tip_id)
                .fetch_one(&mut *tx)
                .await?
        };

        tx.commit().await?;

        Ok(TipLikeOutcome {
            changed: deleted,
            like_count,
        })
    }

    /// Count like rows directly (used to check the cached count)
    pub async fn count_for_tip(tip_id: TipId, pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tip_likes WHERE tip_id = $1")
            .bind(tip_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn exists(tip_id: TipId, member_id: MemberId, pool: &PgPool) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tip_likes WHERE tip_id = $1 AND member_id = $2)",
        )
        .bind(tip_id)
        .bind(member_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }
}
