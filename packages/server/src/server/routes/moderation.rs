//! Admin moderation routes, mounted once per submission type:
//!
//! - `POST   /api/{kind}/:id/approve`
//! - `POST   /api/{kind}/:id/reject`  `{"reason": "..."}`
//! - `DELETE /api/{kind}/:id`

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::common::{AdminCapability, Id};
use crate::domains::moderation::{actions, Moderatable};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// Routes for one moderatable submission type, to be nested under its prefix
pub fn submission_routes<T>() -> Router
where
    T: Moderatable + Serialize,
{
    Router::new()
        .route("/:id", delete(delete_submission_handler::<T>))
        .route("/:id/approve", post(approve_handler::<T>))
        .route("/:id/reject", post(reject_handler::<T>))
}

pub async fn approve_handler<T>(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<Id<T::Marker>>,
) -> Result<Json<T>, ApiError>
where
    T: Moderatable + Serialize,
{
    let admin_id = user
        .actor()
        .can(AdminCapability::ModerateSubmissions)
        .check()?;

    let record = actions::approve::<T>(id, admin_id, &state.deps).await?;
    Ok(Json(record))
}

pub async fn reject_handler<T>(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<Id<T::Marker>>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<T>, ApiError>
where
    T: Moderatable + Serialize,
{
    let admin_id = user
        .actor()
        .can(AdminCapability::ModerateSubmissions)
        .check()?;

    let record = actions::reject::<T>(id, admin_id, body.reason, &state.deps).await?;
    Ok(Json(record))
}

pub async fn delete_submission_handler<T>(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<Id<T::Marker>>,
) -> Result<StatusCode, ApiError>
where
    T: Moderatable + Serialize,
{
    user.actor()
        .can(AdminCapability::DeleteSubmissions)
        .check()?;

    actions::delete::<T>(id, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}
