//! Member domain - the people who submit, moderate, register and like.

pub mod models;

pub use models::{Member, NewMember};
