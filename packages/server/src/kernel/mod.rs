//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod notifications;
pub mod notifiers;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use notifications::{Notification, NotificationDispatcher, NotificationKind};
pub use notifiers::{LoggingNotifier, WebhookNotifier};
pub use test_dependencies::{FailingNotifier, RecordingNotifier, TestDependencies};
pub use traits::*;
