//! Event and registration routes.
//!
//! Any signed-in member registers or cancels for themselves; event
//! administration and attendance need `ManageEvents`.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::common::{AdminCapability, EventId, RegistrationId};
use crate::domains::events::{actions, Event, EventRegistration, NewEvent};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelRegistrationRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    pub attended: bool,
}

/// `POST /api/events`
pub async fn create_event_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let organizer_id = user.actor().can(AdminCapability::ManageEvents).check()?;

    let input = NewEvent {
        organizer_id,
        title: body.title,
        description: body.description,
        location: body.location,
        starts_at: body.starts_at,
        ends_at: body.ends_at,
        capacity: body.capacity,
    };

    let event = actions::create_event(input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// `POST /api/events/:id/publish`
pub async fn publish_event_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> Result<Json<Event>, ApiError> {
    user.actor().can(AdminCapability::ManageEvents).check()?;
    Ok(Json(actions::publish_event(event_id, &state.deps).await?))
}

/// `POST /api/events/:id/cancel`
pub async fn cancel_event_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> Result<Json<Event>, ApiError> {
    user.actor().can(AdminCapability::ManageEvents).check()?;
    Ok(Json(actions::cancel_event(event_id, &state.deps).await?))
}

/// `POST /api/events/:id/complete`
pub async fn complete_event_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> Result<Json<Event>, ApiError> {
    user.actor().can(AdminCapability::ManageEvents).check()?;
    Ok(Json(actions::complete_event(event_id, &state.deps).await?))
}

/// `POST /api/events/:id/reconcile`
pub async fn reconcile_event_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> Result<Json<Event>, ApiError> {
    user.actor().can(AdminCapability::ManageEvents).check()?;
    Ok(Json(
        actions::reconcile_registered_count(event_id, &state.deps).await?,
    ))
}

/// `POST /api/events/:id/registrations`
pub async fn register_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> Result<(StatusCode, Json<EventRegistration>), ApiError> {
    let registration = actions::register(event_id, user.member_id, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// `DELETE /api/events/:id/registrations` with an optional `{"reason": "..."}`
pub async fn cancel_registration_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
    body: Option<Json<CancelRegistrationRequest>>,
) -> Result<Json<EventRegistration>, ApiError> {
    let Json(body) = body.unwrap_or_default();

    let registration = actions::cancel(event_id, user.member_id, body.reason, &state.deps).await?;
    Ok(Json(registration))
}

/// `POST /api/registrations/:id/attendance`
pub async fn attendance_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(registration_id): Path<RegistrationId>,
    Json(body): Json<AttendanceRequest>,
) -> Result<Json<EventRegistration>, ApiError> {
    user.actor().can(AdminCapability::ManageEvents).check()?;

    let registration =
        actions::mark_attendance(registration_id, body.attended, &state.deps).await?;
    Ok(Json(registration))
}
