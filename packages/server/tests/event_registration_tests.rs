//! Capacity-bounded event registration integration tests
//!
//! The core guarantee under test: `registered_count` equals the number of
//! confirmed registrations and never exceeds capacity, no matter how requests
//! interleave.

mod common;

use std::sync::Arc;

use chrono::Duration;

use crate::common::{
    corrupt_registered_count, create_admin, create_draft_event, create_member, create_open_event,
    start_event, TestHarness,
};
use community_core::common::{CoreError, EventId, MemberId, RegistrationId};
use community_core::domains::events::{
    actions, Event, EventRegistration, EventStatus, NewEvent, RegistrationStatus,
};
use community_core::kernel::{FailingNotifier, NotificationKind, TestDependencies};
use futures::future::join_all;
use sqlx::PgPool;
use test_context::test_context;

/// Assert the cached counter matches the confirmed rows and stays in bounds.
async fn assert_count_consistent(pool: &PgPool, event_id: EventId) -> i32 {
    let event = Event::find_by_id(event_id, pool).await.unwrap().unwrap();
    let confirmed = EventRegistration::count_confirmed(event_id, pool)
        .await
        .unwrap();

    assert_eq!(i64::from(event.registered_count), confirmed);
    assert!(event.registered_count >= 0);
    assert!(event.registered_count <= event.capacity);
    event.registered_count
}

// ============================================================================
// Register / cancel
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn capacity_two_walkthrough(ctx: &TestHarness) {
    let (deps, notifier) = ctx.deps();
    let event = create_open_event(&ctx.db_pool, 2).await;
    let (u1, u2, u3) = (
        create_member(&ctx.db_pool).await,
        create_member(&ctx.db_pool).await,
        create_member(&ctx.db_pool).await,
    );

    actions::register(event.id, u1, &deps).await.unwrap();
    actions::register(event.id, u2, &deps).await.unwrap();
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 2);

    assert!(matches!(
        actions::register(event.id, u3, &deps).await,
        Err(CoreError::EventFull)
    ));
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 2);

    let cancelled = actions::cancel(event.id, u1, Some("Sick kid".to_string()), &deps)
        .await
        .unwrap();
    assert_eq!(cancelled.status, RegistrationStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Sick kid"));
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 1);

    actions::register(event.id, u3, &deps).await.unwrap();
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 2);

    let confirmations = notifier.wait_for(3).await;
    assert_eq!(confirmations.len(), 3);
    assert!(confirmations
        .iter()
        .all(|n| n.kind == NotificationKind::RegistrationConfirmed));
    assert!(notifier.was_sent_to(NotificationKind::RegistrationConfirmed, u3));
    assert_eq!(confirmations[0].payload["event_title"], "Community garden workday");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn register_unknown_member_is_not_found(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let event = create_open_event(&ctx.db_pool, 5).await;

    assert!(matches!(
        actions::register(event.id, MemberId::new(), &deps).await,
        Err(CoreError::NotFound { entity: "member", .. })
    ));
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn failed_notification_does_not_fail_registration(ctx: &TestHarness) {
    let deps = ctx.deps_with(TestDependencies::new().notifier(Arc::new(FailingNotifier)));
    let event = create_open_event(&ctx.db_pool, 2).await;
    let member = create_member(&ctx.db_pool).await;

    let registration = actions::register(event.id, member, &deps)
        .await
        .expect("register should succeed even when delivery fails");
    assert_eq!(registration.status, RegistrationStatus::Confirmed);
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn double_register_is_rejected(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let event = create_open_event(&ctx.db_pool, 5).await;
    let user = create_member(&ctx.db_pool).await;

    actions::register(event.id, user, &deps).await.unwrap();
    let again = actions::register(event.id, user, &deps).await;

    assert!(matches!(again, Err(CoreError::AlreadyRegistered)));
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reregistering_reuses_the_same_row(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let event = create_open_event(&ctx.db_pool, 3).await;
    let user = create_member(&ctx.db_pool).await;

    let first = actions::register(event.id, user, &deps).await.unwrap();
    actions::cancel(event.id, user, None, &deps).await.unwrap();
    let second = actions::register(event.id, user, &deps).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.status, RegistrationStatus::Confirmed);
    assert!(second.cancelled_at.is_none());
    assert!(second.cancellation_reason.is_none());

    let roster = EventRegistration::find_for_event(event.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn cancel_twice_is_not_found(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let event = create_open_event(&ctx.db_pool, 3).await;
    let user = create_member(&ctx.db_pool).await;

    actions::register(event.id, user, &deps).await.unwrap();
    actions::cancel(event.id, user, None, &deps).await.unwrap();

    let again = actions::cancel(event.id, user, None, &deps).await;
    assert!(matches!(
        again,
        Err(CoreError::NotFound { entity: "registration", .. })
    ));
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn cancel_without_registration_is_not_found(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let event = create_open_event(&ctx.db_pool, 3).await;
    let user = create_member(&ctx.db_pool).await;

    assert!(matches!(
        actions::cancel(event.id, user, None, &deps).await,
        Err(CoreError::NotFound { .. })
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn register_for_unknown_event_is_not_found(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let user = create_member(&ctx.db_pool).await;

    assert!(matches!(
        actions::register(EventId::new(), user, &deps).await,
        Err(CoreError::NotFound { entity: "event", .. })
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn closed_events_reject_registration(ctx: &TestHarness) {
    let (deps, notifier) = ctx.deps();
    let organizer = create_admin(&ctx.db_pool).await;
    let user = create_member(&ctx.db_pool).await;

    // Still a draft
    let draft = create_draft_event(&ctx.db_pool, organizer, 10, Duration::days(3)).await;
    assert!(matches!(
        actions::register(draft.id, user, &deps).await,
        Err(CoreError::EventNotOpen)
    ));

    // Already started
    let started = create_open_event(&ctx.db_pool, 10).await;
    start_event(&ctx.db_pool, started.id).await;
    assert!(matches!(
        actions::register(started.id, user, &deps).await,
        Err(CoreError::EventNotOpen)
    ));

    // Cancelled by the organizer
    let cancelled = create_open_event(&ctx.db_pool, 10).await;
    actions::cancel_event(cancelled.id, &deps).await.unwrap();
    assert!(matches!(
        actions::register(cancelled.id, user, &deps).await,
        Err(CoreError::EventNotOpen)
    ));

    for event_id in [draft.id, started.id, cancelled.id] {
        assert_eq!(assert_count_consistent(&ctx.db_pool, event_id).await, 0);
        assert!(EventRegistration::find_active(event_id, user, &ctx.db_pool)
            .await
            .unwrap()
            .is_none());
    }
    assert!(notifier.sent().is_empty());
}

// ============================================================================
// Concurrency
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_seat_goes_to_exactly_one_caller(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let event = create_open_event(&ctx.db_pool, 1).await;

    let mut users = Vec::new();
    for _ in 0..10 {
        users.push(create_member(&ctx.db_pool).await);
    }

    let handles = users.iter().map(|&user| {
        let deps = deps.clone();
        tokio::spawn(async move { actions::register(event.id, user, &deps).await })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(CoreError::EventFull))));
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 1);
}

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_user_racing_registers_once(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let event = create_open_event(&ctx.db_pool, 5).await;
    let user = create_member(&ctx.db_pool).await;

    let handles = (0..6).map(|_| {
        let deps = deps.clone();
        tokio::spawn(async move { actions::register(event.id, user, &deps).await })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(CoreError::AlreadyRegistered))));
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 1);
}

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn interleaved_register_and_cancel_keep_count_consistent(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let capacity = 5;
    let event = create_open_event(&ctx.db_pool, capacity).await;

    let mut users = Vec::new();
    for _ in 0..12 {
        users.push(create_member(&ctx.db_pool).await);
    }

    // Each user registers, cancels, and registers again, all at once
    let handles = users.iter().map(|&user| {
        let deps = deps.clone();
        tokio::spawn(async move {
            let _ = actions::register(event.id, user, &deps).await;
            let _ = actions::cancel(event.id, user, None, &deps).await;
            let _ = actions::register(event.id, user, &deps).await;
        })
    });
    for joined in join_all(handles).await {
        joined.expect("task panicked");
    }

    let count = assert_count_consistent(&ctx.db_pool, event.id).await;
    assert!(count <= capacity);
}

// ============================================================================
// Attendance
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn attendance_recorded_after_event_starts(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let event = create_open_event(&ctx.db_pool, 3).await;
    let user = create_member(&ctx.db_pool).await;
    let registration = actions::register(event.id, user, &deps).await.unwrap();

    let early = actions::mark_attendance(registration.id, true, &deps).await;
    assert!(matches!(
        early,
        Err(CoreError::InvalidTransition { ref from, .. }) if from == "upcoming"
    ));

    start_event(&ctx.db_pool, event.id).await;

    let marked = actions::mark_attendance(registration.id, true, &deps)
        .await
        .unwrap();
    assert_eq!(marked.attended, Some(true));
    assert!(marked.attended_at.is_some());

    // Correcting the record overwrites it
    let corrected = actions::mark_attendance(registration.id, false, &deps)
        .await
        .unwrap();
    assert_eq!(corrected.attended, Some(false));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn attendance_requires_confirmed_registration(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let event = create_open_event(&ctx.db_pool, 3).await;
    let user = create_member(&ctx.db_pool).await;
    let registration = actions::register(event.id, user, &deps).await.unwrap();
    actions::cancel(event.id, user, None, &deps).await.unwrap();
    start_event(&ctx.db_pool, event.id).await;

    assert!(matches!(
        actions::mark_attendance(registration.id, true, &deps).await,
        Err(CoreError::InvalidTransition { ref from, .. }) if from == "cancelled"
    ));
    assert!(matches!(
        actions::mark_attendance(RegistrationId::new(), true, &deps).await,
        Err(CoreError::NotFound { .. })
    ));
}

// ============================================================================
// Event administration
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn event_lifecycle_transitions(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let organizer = create_admin(&ctx.db_pool).await;

    let invalid = actions::create_event(
        NewEvent::builder()
            .organizer_id(organizer)
            .title("Zero seats")
            .description("")
            .starts_at(chrono::Utc::now() + Duration::days(1))
            .capacity(0)
            .build(),
        &deps,
    )
    .await;
    assert!(matches!(invalid, Err(CoreError::InvalidInput(_))));

    let starts_at = chrono::Utc::now() + Duration::days(1);
    let backwards = actions::create_event(
        NewEvent::builder()
            .organizer_id(organizer)
            .title("Backwards")
            .description("")
            .starts_at(starts_at)
            .ends_at(starts_at - Duration::hours(2))
            .capacity(10)
            .build(),
        &deps,
    )
    .await;
    assert!(matches!(backwards, Err(CoreError::InvalidInput(_))));

    let event = actions::create_event(
        NewEvent::builder()
            .organizer_id(organizer)
            .title("Block party")
            .description("Potluck on Elm St")
            .starts_at(chrono::Utc::now() + Duration::days(1))
            .capacity(50)
            .build(),
        &deps,
    )
    .await
    .unwrap();
    assert_eq!(event.status, EventStatus::Draft);
    assert_eq!(event.registered_count, 0);

    assert!(matches!(
        actions::complete_event(event.id, &deps).await,
        Err(CoreError::InvalidTransition { ref from, .. }) if from == "draft"
    ));

    let published = actions::publish_event(event.id, &deps).await.unwrap();
    assert_eq!(published.status, EventStatus::Published);
    assert!(matches!(
        actions::publish_event(event.id, &deps).await,
        Err(CoreError::InvalidTransition { .. })
    ));

    let completed = actions::complete_event(event.id, &deps).await.unwrap();
    assert_eq!(completed.status, EventStatus::Completed);
    assert!(matches!(
        actions::cancel_event(event.id, &deps).await,
        Err(CoreError::InvalidTransition { ref from, .. }) if from == "completed"
    ));

    assert!(matches!(
        actions::publish_event(EventId::new(), &deps).await,
        Err(CoreError::NotFound { .. })
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reconcile_repairs_drifted_counter(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let event = create_open_event(&ctx.db_pool, 5).await;
    for _ in 0..3 {
        let user = create_member(&ctx.db_pool).await;
        actions::register(event.id, user, &deps).await.unwrap();
    }

    corrupt_registered_count(&ctx.db_pool, event.id, 1).await;

    let repaired = actions::reconcile_registered_count(event.id, &deps)
        .await
        .unwrap();
    assert_eq!(repaired.registered_count, 3);
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 3);

    assert!(matches!(
        actions::reconcile_registered_count(EventId::new(), &deps).await,
        Err(CoreError::NotFound { .. })
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn cancel_recovers_when_counter_already_zero(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let event = create_open_event(&ctx.db_pool, 5).await;
    let (u1, u2) = (
        create_member(&ctx.db_pool).await,
        create_member(&ctx.db_pool).await,
    );
    actions::register(event.id, u1, &deps).await.unwrap();
    actions::register(event.id, u2, &deps).await.unwrap();

    corrupt_registered_count(&ctx.db_pool, event.id, 0).await;

    actions::cancel(event.id, u1, None, &deps).await.unwrap();

    // Recounted from rows instead of underflowing
    assert_eq!(assert_count_consistent(&ctx.db_pool, event.id).await, 1);
}
