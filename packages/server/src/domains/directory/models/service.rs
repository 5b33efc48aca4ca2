use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::{markers, MemberId, ServiceId};
use crate::domains::moderation::{Moderatable, ModerationState};

/// Service listing (tutoring, repairs, childcare...) offered by a member
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Service {
    pub id: ServiceId,
    pub submitted_by: MemberId,
    pub owner_id: MemberId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price_range: Option<String>,
    pub service_area: Option<String>,
    pub is_published: bool,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub moderation: ModerationState,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct NewService {
    pub submitted_by: MemberId,
    #[builder(default, setter(strip_option))]
    pub owner: Option<MemberId>,
    #[builder(setter(into))]
    pub title: String,
    #[builder(setter(into))]
    pub description: String,
    #[builder(setter(into))]
    pub category: String,
    #[builder(default, setter(strip_option, into))]
    pub price_range: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub service_area: Option<String>,
}

impl Service {
    /// Create a new service submission (starts as pending)
    pub async fn create(input: NewService, pool: &PgPool) -> Result<Self> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (
                submitted_by,
                owner_id,
                title,
                description,
                category,
                price_range,
                service_area
            )
            VALUES ($1, COALESCE($2, $1), $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.submitted_by)
        .bind(input.owner)
        .bind(input.title)
        .bind(input.description)
        .bind(input.category)
        .bind(input.price_range)
        .bind(input.service_area)
        .fetch_one(pool)
        .await?;
        Ok(service)
    }
}

impl Moderatable for Service {
    type Marker = markers::Service;

    const ENTITY: &'static str = "service";
    const TABLE: &'static str = "services";
    const GO_LIVE_SQL: &'static str = ", is_published = ($2 = 'approved')";

    fn id(&self) -> ServiceId {
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
