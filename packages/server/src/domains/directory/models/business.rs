use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::{markers, BusinessId, MemberId};
use crate::domains::moderation::{Moderatable, ModerationState};

/// Business listing - hidden from the public directory until approved
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Business {
    pub id: BusinessId,
    pub submitted_by: MemberId,
    pub owner_id: MemberId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website_url: Option<String>,
    pub is_published: bool,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub moderation: ModerationState,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a new business submission
#[derive(Debug, Clone, TypedBuilder)]
pub struct NewBusiness {
    pub submitted_by: MemberId,
    /// Defaults to the submitter
    #[builder(default, setter(strip_option))]
    pub owner: Option<MemberId>,
    #[builder(setter(into))]
    pub name: String,
    #[builder(setter(into))]
    pub description: String,
    #[builder(setter(into))]
    pub category: String,
    #[builder(default, setter(strip_option, into))]
    pub address: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub phone: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub website_url: Option<String>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Business {
    /// Create a new business submission (starts as pending)
    pub async fn create(input: NewBusiness, pool: &PgPool) -> Result<Self> {
        let business = sqlx::query_as::<_, Business>(
            r#"
            INSERT INTO businesses (
                submitted_by,
                owner_id,
                name,
                description,
                category,
                address,
                phone,
                website_url
            )
            VALUES ($1, COALESCE($2, $1), $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(input.submitted_by)
        .bind(input.owner)
        .bind(input.name)
        .bind(input.description)
        .bind(input.category)
        .bind(input.address)
        .bind(input.phone)
        .bind(input.website_url)
        .fetch_one(pool)
        .await?;
        Ok(business)
    }

    /// Find published businesses in a category
    pub async fn find_published_by_category(category: &str, pool: &PgPool) -> Result<Vec<Self>> {
        let businesses = sqlx::query_as::<_, Business>(
            "SELECT * FROM businesses WHERE is_published = true AND category = $1 ORDER BY name",
        )
        .bind(category)
        .fetch_all(pool)
        .await?;
        Ok(businesses)
    }
}

impl Moderatable for Business {
    type Marker = markers::Business;

    const ENTITY: &'static str = "business";
    const TABLE: &'static str = "businesses";
    const GO_LIVE_SQL: &'static str = ", is_published = ($2 = 'approved')";

    fn id(&self) -> BusinessId {
        self.id
    }

    fn submitted_by(&self) -> MemberId {
        self.submitted_by
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn moderation(&self) -> &ModerationState {
        &self.moderation
    }
}
