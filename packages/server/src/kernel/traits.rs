// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Naming convention: Base* for trait names.

use anyhow::Result;
use async_trait::async_trait;

use crate::kernel::notifications::Notification;

// =============================================================================
// Notifier Trait (Infrastructure - outbound delivery)
// =============================================================================

/// Delivers a single notification (email gateway, webhook, log sink).
///
/// Called only from the dispatcher worker, never from an action, so an error
/// here can never fail a state transition.
#[async_trait]
pub trait BaseNotifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}
