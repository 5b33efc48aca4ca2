//! Typed ID definitions for all domain entities.
//!
//! Marker types live in [`markers`] so they never collide with the model
//! structs of the same name in `domains::*::models`.

pub use super::id::Id;

pub mod markers {
    /// Registered platform user (submitter, admin, attendee).
    pub struct Member;

    /// Directory listing for a local business.
    pub struct Business;

    /// Directory listing for a service offering.
    pub struct Service;

    /// Community tip.
    pub struct Tip;

    /// Community event with a seat limit.
    pub struct Event;

    /// A member's seat on an event roster.
    pub struct EventRegistration;
}

pub type MemberId = Id<markers::Member>;
pub type BusinessId = Id<markers::Business>;
pub type ServiceId = Id<markers::Service>;
pub type TipId = Id<markers::Tip>;
pub type EventId = Id<markers::Event>;
pub type RegistrationId = Id<markers::EventRegistration>;
