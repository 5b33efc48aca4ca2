//! Events domain - community events with a bounded roster.
//!
//! `events.registered_count` always equals the number of confirmed
//! registrations and never exceeds `capacity`.

pub mod actions;
pub mod models;

pub use models::{DueReminder, Event, EventRegistration, EventStatus, NewEvent, RegistrationStatus};
