//! Concrete notifier implementations.
//!
//! Email rendering and delivery live in a separate service; this process either
//! forwards notifications to that service's webhook or just logs them.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::kernel::notifications::Notification;
use crate::kernel::BaseNotifier;

/// Logs every notification. Default when no webhook is configured.
pub struct LoggingNotifier;

#[async_trait]
impl BaseNotifier for LoggingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        info!(
            kind = %notification.kind,
            recipient = %notification.recipient,
            payload = %notification.payload,
            "Notification (log only)"
        );
        Ok(())
    }
}

/// POSTs each notification as JSON to the mail service webhook.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(url: String) -> Result<Self> {
        Self::with_timeout(url, Self::REQUEST_TIMEOUT)
    }

    /// Deliveries are serial, so a hung webhook must not hold the worker.
    pub fn with_timeout(url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build notification webhook client")?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl BaseNotifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .context("Notification webhook request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Notification webhook returned {}: {}", status, body);
        }

        Ok(())
    }
}
