use axum::{
    extract::{Extension, Path},
    Json,
};

use crate::common::TipId;
use crate::domains::engagement::{actions, LikeSummary};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;

/// `POST /api/tips/:id/like`
pub async fn like_tip_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(tip_id): Path<TipId>,
) -> Result<Json<LikeSummary>, ApiError> {
    let summary = actions::like(tip_id, user.member_id, &state.deps).await?;
    Ok(Json(summary))
}

/// `DELETE /api/tips/:id/like`
pub async fn unlike_tip_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(tip_id): Path<TipId>,
) -> Result<Json<LikeSummary>, ApiError> {
    let summary = actions::unlike(tip_id, user.member_id, &state.deps).await?;
    Ok(Json(summary))
}
