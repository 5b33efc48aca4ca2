use anyhow::{Context, Result};
use chrono::Duration;
use dotenvy::dotenv;
use std::env;

use crate::domains::engagement::EngagementPolicy;
use crate::domains::moderation::ModerationPolicy;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub notification_webhook_url: Option<String>,
    pub rejection_reason_min_len: usize,
    pub strict_like_toggle: bool,
    pub reminder_lead_hours: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER")
                .unwrap_or_else(|_| "community-platform".to_string()),
            notification_webhook_url: env::var("NOTIFICATION_WEBHOOK_URL").ok(),
            rejection_reason_min_len: env::var("REJECTION_REASON_MIN_LEN")
                .unwrap_or_else(|_| ModerationPolicy::DEFAULT_MIN_REASON_LEN.to_string())
                .parse()
                .context("REJECTION_REASON_MIN_LEN must be a valid number")?,
            strict_like_toggle: env::var("STRICT_LIKE_TOGGLE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("STRICT_LIKE_TOGGLE must be true or false")?,
            reminder_lead_hours: env::var("REMINDER_LEAD_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .context("REMINDER_LEAD_HOURS must be a valid number")?,
        })
    }

    pub fn moderation_policy(&self) -> ModerationPolicy {
        ModerationPolicy {
            min_reason_len: self.rejection_reason_min_len,
        }
    }

    pub fn engagement_policy(&self) -> EngagementPolicy {
        EngagementPolicy {
            strict_toggle: self.strict_like_toggle,
        }
    }

    pub fn reminder_lead(&self) -> Duration {
        Duration::hours(self.reminder_lead_hours)
    }
}
