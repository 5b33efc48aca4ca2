//! Engagement domain - like/unlike on tips.

pub mod actions;
pub mod policy;

pub use actions::LikeSummary;
pub use policy::EngagementPolicy;
