//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use chrono::{Duration, Utc};
use community_core::common::{EventId, MemberId};
use community_core::domains::directory::{Business, NewBusiness, NewService, Service};
use community_core::domains::events::{Event, NewEvent};
use community_core::domains::member::{Member, NewMember};
use community_core::domains::tips::{NewTip, Tip};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create_member(pool: &PgPool) -> MemberId {
    create_member_with_role(pool, false).await
}

pub async fn create_admin(pool: &PgPool) -> MemberId {
    create_member_with_role(pool, true).await
}

async fn create_member_with_role(pool: &PgPool, is_admin: bool) -> MemberId {
    let tag = Uuid::new_v4();
    let member = Member::create(
        NewMember::builder()
            .email(format!("member-{}@example.org", tag))
            .display_name(format!("Member {}", &tag.to_string()[..8]))
            .is_admin(is_admin)
            .build(),
        pool,
    )
    .await
    .expect("Failed to create member");
    member.id
}

pub async fn create_pending_business(pool: &PgPool, submitted_by: MemberId) -> Business {
    Business::create(
        NewBusiness::builder()
            .submitted_by(submitted_by)
            .name("Corner Bakery")
            .description("Fresh bread every morning")
            .category("food")
            .address("12 Main St")
            .build(),
        pool,
    )
    .await
    .expect("Failed to create business")
}

pub async fn create_pending_service(pool: &PgPool, submitted_by: MemberId) -> Service {
    Service::create(
        NewService::builder()
            .submitted_by(submitted_by)
            .title("Bike repair")
            .description("Tune-ups and flat fixes")
            .category("repair")
            .price_range("$10-$40")
            .build(),
        pool,
    )
    .await
    .expect("Failed to create service")
}

pub async fn create_pending_tip(pool: &PgPool, submitted_by: MemberId) -> Tip {
    Tip::create(
        NewTip::builder()
            .submitted_by(submitted_by)
            .title("Library tool lending")
            .content("The branch on 5th lends power tools with a library card.")
            .category("saving-money")
            .build(),
        pool,
    )
    .await
    .expect("Failed to create tip")
}

/// A draft event starting `starts_in` from now
pub async fn create_draft_event(
    pool: &PgPool,
    organizer_id: MemberId,
    capacity: i32,
    starts_in: Duration,
) -> Event {
    Event::create(
        NewEvent::builder()
            .organizer_id(organizer_id)
            .title("Community garden workday")
            .description("Bring gloves")
            .location("Lot 7")
            .starts_at(Utc::now() + starts_in)
            .capacity(capacity)
            .build(),
        pool,
    )
    .await
    .expect("Failed to create event")
}

/// A published event one week out
pub async fn create_open_event(pool: &PgPool, capacity: i32) -> Event {
    create_open_event_starting_in(pool, capacity, Duration::days(7)).await
}

pub async fn create_open_event_starting_in(
    pool: &PgPool,
    capacity: i32,
    starts_in: Duration,
) -> Event {
    let organizer = create_admin(pool).await;
    let event = create_draft_event(pool, organizer, capacity, starts_in).await;
    Event::publish(event.id, pool)
        .await
        .expect("Failed to publish event")
        .expect("Draft event should publish")
}

/// Move the event's start into the past, as if time had passed.
pub async fn start_event(pool: &PgPool, event_id: EventId) {
    sqlx::query("UPDATE events SET starts_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(event_id)
        .execute(pool)
        .await
        .expect("Failed to move event start");
}

/// Overwrite the cached seat counter, simulating drift.
pub async fn corrupt_registered_count(pool: &PgPool, event_id: EventId, value: i32) {
    sqlx::query("UPDATE events SET registered_count = $2 WHERE id = $1")
        .bind(event_id)
        .bind(value)
        .execute(pool)
        .await
        .expect("Failed to overwrite registered_count");
}
