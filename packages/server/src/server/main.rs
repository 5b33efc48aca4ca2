// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use community_core::domains::auth::JwtService;
use community_core::kernel::{
    scheduled_tasks::start_scheduler, BaseNotifier, LoggingNotifier, NotificationDispatcher,
    ServerDeps, WebhookNotifier,
};
use community_core::{server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,community_core=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Community Platform API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Notification delivery: webhook if configured, otherwise log only
    let notifier: Arc<dyn BaseNotifier> = match &config.notification_webhook_url {
        Some(url) => {
            tracing::info!(url = %url, "Delivering notifications via webhook");
            Arc::new(WebhookNotifier::new(url.clone())?)
        }
        None => {
            tracing::info!("NOTIFICATION_WEBHOOK_URL not set, notifications are logged only");
            Arc::new(LoggingNotifier)
        }
    };
    let (notifications, _notification_worker) = NotificationDispatcher::spawn(notifier);

    let deps = ServerDeps::new(
        pool,
        notifications,
        config.moderation_policy(),
        config.engagement_policy(),
    );

    let _scheduler = start_scheduler(deps.clone(), config.reminder_lead())
        .await
        .context("Failed to start scheduled tasks")?;

    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));
    let app = build_app(deps, jwt_service);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
