// Community Platform - Core
//
// Moderated directory submissions (businesses, services, tips), capacity-bounded
// event registration and tip likes. Models own their SQL, actions own the state
// machines, the kernel owns infrastructure (notifications, scheduling).

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
