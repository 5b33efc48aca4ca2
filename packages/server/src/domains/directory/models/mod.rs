pub mod business;
pub mod service;

pub use business::{Business, NewBusiness};
pub use service::{NewService, Service};
