pub mod event;
pub mod registration;

pub use event::{Event, EventStatus, NewEvent};
pub use registration::{DueReminder, EventRegistration, RegistrationStatus};
