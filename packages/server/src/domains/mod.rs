// Business domains
pub mod auth;
pub mod directory;
pub mod engagement;
pub mod events;
pub mod member;
pub mod moderation;
pub mod tips;
