// TestDependencies - mock implementations for testing
//
// Provides notifiers that record or fail, and a builder for ServerDeps backed
// by a test database.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::notifications::{Notification, NotificationDispatcher, NotificationKind};
use super::{BaseNotifier, ServerDeps};
use crate::common::MemberId;
use crate::domains::engagement::EngagementPolicy;
use crate::domains::moderation::ModerationPolicy;

// =============================================================================
// Recording Notifier
// =============================================================================

pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of everything delivered so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_of_kind(&self, kind: NotificationKind) -> Vec<Notification> {
        self.sent().into_iter().filter(|n| n.kind == kind).collect()
    }

    pub fn was_sent_to(&self, kind: NotificationKind, recipient: MemberId) -> bool {
        self.sent()
            .iter()
            .any(|n| n.kind == kind && n.recipient == recipient)
    }

    /// Wait (up to 5s) until at least `count` notifications were delivered.
    ///
    /// Delivery happens on the dispatcher worker, after the action returned.
    pub async fn wait_for(&self, count: usize) -> Vec<Notification> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let sent = self.sent();
            if sent.len() >= count || tokio::time::Instant::now() >= deadline {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseNotifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

// =============================================================================
// Failing Notifier
// =============================================================================

/// Fails every delivery, for asserting failures never reach the caller.
pub struct FailingNotifier;

#[async_trait]
impl BaseNotifier for FailingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        anyhow::bail!("mail gateway unreachable ({})", notification.kind)
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Builder for ServerDeps in tests
pub struct TestDependencies {
    pub notifier: Arc<dyn BaseNotifier>,
    pub moderation_policy: ModerationPolicy,
    pub engagement_policy: EngagementPolicy,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            notifier: Arc::new(RecordingNotifier::new()),
            moderation_policy: ModerationPolicy::default(),
            engagement_policy: EngagementPolicy::default(),
        }
    }

    pub fn notifier(mut self, notifier: Arc<dyn BaseNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn moderation_policy(mut self, policy: ModerationPolicy) -> Self {
        self.moderation_policy = policy;
        self
    }

    pub fn engagement_policy(mut self, policy: EngagementPolicy) -> Self {
        self.engagement_policy = policy;
        self
    }

    /// Spawns the notification worker; call from within a tokio runtime.
    pub fn into_server_deps(self, db_pool: PgPool) -> ServerDeps {
        let (notifications, _worker) = NotificationDispatcher::spawn(self.notifier);
        ServerDeps::new(
            db_pool,
            notifications,
            self.moderation_policy,
            self.engagement_policy,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
