//! Event actions - capacity-bounded registration and event administration.
//!
//! Per (user, event):
//!
//! ```text
//! unregistered ──register──► confirmed ──cancel──► cancelled
//!                               ▲                      │
//!                               └──────register────────┘
//! ```
//!
//! Every change to a registration's status and the matching change to
//! `events.registered_count` commit in one transaction.

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{error, info, warn};

use crate::common::{CoreError, CoreResult, EventId, MemberId, RegistrationId};
use crate::domains::events::models::{Event, EventRegistration, NewEvent};
use crate::domains::member::Member;
use crate::kernel::{Notification, NotificationKind, ServerDeps};

const EVENT: &str = "event";
const MEMBER: &str = "member";
const REGISTRATION: &str = "registration";

// =============================================================================
// Registration
// =============================================================================

/// Take a seat on the event for `user_id`.
///
/// A previously cancelled registration is reactivated rather than duplicated.
/// When one seat remains, concurrent callers serialize on the event row and
/// exactly one of them gets it; the rest receive `EventFull`.
pub async fn register(
    event_id: EventId,
    user_id: MemberId,
    deps: &ServerDeps,
) -> CoreResult<EventRegistration> {
    let pool = &deps.db_pool;

    info!(event_id = %event_id, user_id = %user_id, "Registering for event");

    let event = Event::find_by_id(event_id, pool)
        .await?
        .ok_or_else(|| CoreError::not_found(EVENT, event_id))?;
    if !event.is_open_for_registration(Utc::now()) {
        return Err(CoreError::EventNotOpen);
    }
    if Member::find_by_id(user_id, pool).await?.is_none() {
        return Err(CoreError::not_found(MEMBER, user_id));
    }

    let mut tx = pool.begin().await?;

    let Some(registration) = EventRegistration::confirm(event_id, user_id, &mut tx).await? else {
        warn!(event_id = %event_id, user_id = %user_id, "Already registered");
        return Err(CoreError::AlreadyRegistered);
    };

    let Some(registered_count) = Event::take_seat(event_id, &mut tx).await? else {
        // Re-read inside the transaction to report why the seat guard failed.
        let current = Event::find_by_id_in(event_id, &mut tx).await?;
        tx.rollback().await?;

        return Err(match current {
            None => CoreError::not_found(EVENT, event_id),
            Some(event) if !event.is_open_for_registration(Utc::now()) => CoreError::EventNotOpen,
            Some(event) => {
                warn!(
                    event_id = %event_id,
                    user_id = %user_id,
                    capacity = event.capacity,
                    "Event full"
                );
                CoreError::EventFull
            }
        });
    };

    tx.commit().await?;

    info!(
        event_id = %event_id,
        user_id = %user_id,
        registration_id = %registration.id,
        registered_count,
        capacity = event.capacity,
        "Registration confirmed"
    );

    deps.notifications.dispatch(Notification::new(
        NotificationKind::RegistrationConfirmed,
        user_id,
        json!({
            "event_id": event_id,
            "registration_id": registration.id,
            "event_title": event.title,
            "starts_at": event.starts_at,
            "location": event.location,
        }),
    ));

    Ok(registration)
}

/// Give up a confirmed seat. A second cancel finds nothing to cancel.
pub async fn cancel(
    event_id: EventId,
    user_id: MemberId,
    reason: Option<String>,
    deps: &ServerDeps,
) -> CoreResult<EventRegistration> {
    info!(event_id = %event_id, user_id = %user_id, "Cancelling registration");

    let mut tx = deps.db_pool.begin().await?;

    let Some(registration) =
        EventRegistration::cancel_confirmed(event_id, user_id, reason.as_deref(), &mut tx).await?
    else {
        return Err(CoreError::not_found(
            REGISTRATION,
            format!("{}/{}", event_id, user_id),
        ));
    };

    let registered_count = match Event::release_seat(event_id, &mut tx).await? {
        Some(count) => count,
        None => {
            // The counter was already zero although a confirmed row existed.
            error!(event_id = %event_id, "registered_count out of sync, recounting");
            Event::reconcile_registered_count(event_id, &mut tx)
                .await?
                .map(|event| event.registered_count)
                .unwrap_or_default()
        }
    };

    tx.commit().await?;

    info!(
        event_id = %event_id,
        user_id = %user_id,
        registered_count,
        "Registration cancelled"
    );

    Ok(registration)
}

/// Record whether a confirmed attendee showed up. Only after the event started.
pub async fn mark_attendance(
    registration_id: RegistrationId,
    attended: bool,
    deps: &ServerDeps,
) -> CoreResult<EventRegistration> {
    let pool = &deps.db_pool;

    if let Some(registration) = EventRegistration::set_attendance(registration_id, attended, pool).await? {
        info!(registration_id = %registration_id, attended, "Attendance recorded");
        return Ok(registration);
    }

    let registration = EventRegistration::find_by_id(registration_id, pool)
        .await?
        .ok_or_else(|| CoreError::not_found(REGISTRATION, registration_id))?;

    if !registration.is_confirmed() {
        return Err(CoreError::invalid_transition(
            REGISTRATION,
            registration_id,
            registration.status,
            "mark attendance",
        ));
    }

    Err(CoreError::invalid_transition(
        REGISTRATION,
        registration_id,
        "upcoming",
        "mark attendance",
    ))
}

// =============================================================================
// Reminders
// =============================================================================

/// Send one reminder per confirmed registration whose event starts within
/// `lead`. Returns how many reminders this call claimed.
pub async fn send_due_reminders(lead: Duration, deps: &ServerDeps) -> CoreResult<usize> {
    let pool = &deps.db_pool;
    let due = EventRegistration::find_due_reminders(Utc::now() + lead, pool).await?;

    let mut sent = 0;
    for reminder in due {
        // Another sweeper may have claimed it between the query and now.
        if !EventRegistration::claim_reminder(reminder.registration_id, pool).await? {
            continue;
        }

        deps.notifications.dispatch(Notification::new(
            NotificationKind::EventReminder,
            reminder.user_id,
            json!({
                "event_id": reminder.event_id,
                "registration_id": reminder.registration_id,
                "event_title": reminder.event_title,
                "starts_at": reminder.starts_at,
                "location": reminder.location,
            }),
        ));
        sent += 1;
    }

    Ok(sent)
}

// =============================================================================
// Event administration
// =============================================================================

pub async fn create_event(input: NewEvent, deps: &ServerDeps) -> CoreResult<Event> {
    if input.capacity <= 0 {
        return Err(CoreError::InvalidInput(
            "capacity must be a positive number".to_string(),
        ));
    }
    if input.title.trim().is_empty() {
        return Err(CoreError::InvalidInput("title is required".to_string()));
    }
    if input.ends_at.is_some_and(|ends_at| ends_at < input.starts_at) {
        return Err(CoreError::InvalidInput(
            "ends_at must not be before starts_at".to_string(),
        ));
    }

    let event = Event::create(input, &deps.db_pool).await?;
    info!(event_id = %event.id, capacity = event.capacity, "Event created");
    Ok(event)
}

pub async fn publish_event(event_id: EventId, deps: &ServerDeps) -> CoreResult<Event> {
    let updated = Event::publish(event_id, &deps.db_pool).await?;
    finish_transition(event_id, updated, "publish", deps).await
}

pub async fn cancel_event(event_id: EventId, deps: &ServerDeps) -> CoreResult<Event> {
    let updated = Event::cancel(event_id, &deps.db_pool).await?;
    finish_transition(event_id, updated, "cancel", deps).await
}

pub async fn complete_event(event_id: EventId, deps: &ServerDeps) -> CoreResult<Event> {
    let updated = Event::complete(event_id, &deps.db_pool).await?;
    finish_transition(event_id, updated, "complete", deps).await
}

async fn finish_transition(
    event_id: EventId,
    updated: Option<Event>,
    attempted: &'static str,
    deps: &ServerDeps,
) -> CoreResult<Event> {
    if let Some(event) = updated {
        info!(event_id = %event_id, status = %event.status, "Event status changed");
        return Ok(event);
    }

    match Event::find_by_id(event_id, &deps.db_pool).await? {
        None => Err(CoreError::not_found(EVENT, event_id)),
        Some(current) => Err(CoreError::invalid_transition(
            EVENT,
            event_id,
            current.status,
            attempted,
        )),
    }
}

/// Recompute `registered_count` from the registration rows (admin repair).
pub async fn reconcile_registered_count(event_id: EventId, deps: &ServerDeps) -> CoreResult<Event> {
    let mut tx = deps.db_pool.begin().await?;

    let Some(event) = Event::reconcile_registered_count(event_id, &mut tx).await? else {
        return Err(CoreError::not_found(EVENT, event_id));
    };

    tx.commit().await?;

    info!(event_id = %event_id, registered_count = event.registered_count, "Registered count reconciled");
    Ok(event)
}
