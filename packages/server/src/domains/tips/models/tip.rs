use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::{markers, MemberId, TipId};
use crate::domains::moderation::{Moderatable, ModerationState};

/// Community tip. `published_at` is stamped by the approving update.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tip {
    pub id: TipId,
    pub submitted_by: MemberId,
    pub owner_id: MemberId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Size of the like set, maintained alongside `tip_likes` rows
    pub like_count: i32,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub moderation: ModerationState,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct NewTip {
    pub submitted_by: MemberId,
    #[builder(default, setter(strip_option))]
    pub owner: Option<MemberId>,
    #[builder(setter(into))]
    pub title: String,
    #[builder(setter(into))]
    pub content: String,
    #[builder(setter(into))]
    pub category: String,
}

impl Tip {
    /// Create a new tip submission (starts as pending)
    pub async fn create(input: NewTip, pool: &PgPool) -> Result<Self> {
        let tip = sqlx::query_as::<_, Tip>(
            r#"
            INSERT INTO tips (submitted_by, owner_id, title, content, category)
            VALUES ($1, COALESCE($2, $1), $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(input.submitted_by)
        .bind(input.owner)
        .bind(input.title)
        .bind(input.content)
        .bind(input.category)
        .fetch_one(pool)
        .await?;
        Ok(tip)
    }

    /// Find published tips, newest first
    pub async fn find_published(pool: &PgPool) -> Result<Vec<Self>> {
        let tips = sqlx::query_as::<_, Tip>(
            "SELECT * FROM tips WHERE published_at IS NOT NULL ORDER BY published_at DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(tips)
    }
}

impl Moderatable for Tip {
    type Marker = markers::Tip;

    const ENTITY: &'static str = "tip";
    const TABLE: &'static str = "tips";
    const GO_LIVE_SQL: &'static str =
        ", published_at = CASE WHEN $2 = 'approved' THEN NOW() ELSE NULL END";

    fn id(&self) -> TipId {
        self.id
    }

    fn submitted_by(&self) -> MemberId {
        self.submitted_by
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn moderation(&self) -> &ModerationState {
        &self.moderation
    }
}
