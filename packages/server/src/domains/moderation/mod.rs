//! Moderation domain - the pending → approved/rejected state machine shared by
//! businesses, services and tips.

pub mod actions;
pub mod models;
pub mod policy;

pub use models::{Moderatable, ModerationDecision, ModerationState, SubmissionStatus};
pub use policy::ModerationPolicy;
