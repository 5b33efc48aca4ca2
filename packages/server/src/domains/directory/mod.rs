//! Directory domain - business and service listings submitted by members.

pub mod models;

pub use models::{Business, NewBusiness, NewService, Service};
