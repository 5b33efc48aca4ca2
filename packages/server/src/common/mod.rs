// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod error;
pub mod id;

pub use auth::{Actor, AdminCapability, AuthError};
pub use entity_ids::*;
pub use error::{CoreError, CoreResult};
pub use id::Id;
