use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::MemberId;

/// Member model - SQL persistence layer
#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct NewMember {
    #[builder(setter(into))]
    pub email: String,
    #[builder(setter(into))]
    pub display_name: String,
    #[builder(default = false)]
    pub is_admin: bool,
}

impl Member {
    pub async fn create(input: NewMember, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO members (email, display_name, is_admin)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(input.email)
        .bind(input.display_name)
        .bind(input.is_admin)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }
}
