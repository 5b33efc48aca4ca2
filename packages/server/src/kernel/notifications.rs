//! Best-effort outbound notification queue.
//!
//! Actions hand a [`Notification`] to [`NotificationDispatcher::dispatch`], which
//! only enqueues it. A single worker task drains the queue and calls the
//! configured [`BaseNotifier`]. Delivery failures are logged and dropped, so an
//! action's result is fixed the moment its write commits.
//!
//! ```text
//! approve/reject/register ──commit──► dispatch() ──mpsc──► worker ──► BaseNotifier
//!                         ◄──result──┘                      └─ error!() on failure
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::common::MemberId;
use crate::kernel::BaseNotifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    SubmissionApproved,
    SubmissionRejected,
    RegistrationConfirmed,
    EventReminder,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::SubmissionApproved => write!(f, "submission-approved"),
            NotificationKind::SubmissionRejected => write!(f, "submission-rejected"),
            NotificationKind::RegistrationConfirmed => write!(f, "registration-confirmed"),
            NotificationKind::EventReminder => write!(f, "event-reminder"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub recipient: MemberId,
    pub payload: serde_json::Value,
}

impl Notification {
    pub fn new(kind: NotificationKind, recipient: MemberId, payload: serde_json::Value) -> Self {
        Self {
            kind,
            recipient,
            payload,
        }
    }
}

/// Handle to the notification queue. Cheap to clone.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<Notification>,
}

impl NotificationDispatcher {
    /// Start the delivery worker. The worker exits once every dispatcher
    /// clone has been dropped and the queue is drained.
    pub fn spawn(notifier: Arc<dyn BaseNotifier>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();

        let handle = tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                match notifier.notify(&notification).await {
                    Ok(()) => debug!(
                        kind = %notification.kind,
                        recipient = %notification.recipient,
                        "Notification delivered"
                    ),
                    Err(e) => error!(
                        kind = %notification.kind,
                        recipient = %notification.recipient,
                        error = %e,
                        "Notification delivery failed"
                    ),
                }
            }
            debug!("Notification worker stopped");
        });

        (Self { tx }, handle)
    }

    /// Enqueue a notification. Never blocks and never fails the caller.
    pub fn dispatch(&self, notification: Notification) {
        let kind = notification.kind;
        let recipient = notification.recipient;
        if self.tx.send(notification).is_err() {
            warn!(kind = %kind, recipient = %recipient, "Notification worker gone, dropping notification");
        }
    }
}
