//! Server dependencies for actions (using traits for testability)
//!
//! The central dependency container handed to every domain action.

use sqlx::PgPool;

use crate::domains::engagement::EngagementPolicy;
use crate::domains::moderation::ModerationPolicy;
use crate::kernel::notifications::NotificationDispatcher;

/// Server dependencies accessible to actions
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Outbound notification queue (fire-and-forget)
    pub notifications: NotificationDispatcher,
    pub moderation_policy: ModerationPolicy,
    pub engagement_policy: EngagementPolicy,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        notifications: NotificationDispatcher,
        moderation_policy: ModerationPolicy,
        engagement_policy: EngagementPolicy,
    ) -> Self {
        Self {
            db_pool,
            notifications,
            moderation_policy,
            engagement_policy,
        }
    }
}
