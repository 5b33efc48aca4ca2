//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (every 15 minutes)
//!     │
//!     └─► send_due_reminders(lead)
//!             └─► claim reminder_sent per registration → dispatch EventReminder
//! ```

use anyhow::Result;
use chrono::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::events::actions as event_actions;
use crate::kernel::ServerDeps;

/// Start all scheduled tasks
pub async fn start_scheduler(deps: ServerDeps, reminder_lead: Duration) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let reminder_job = Job::new_async("0 */15 * * * *", move |_uuid, _lock| {
        let deps = deps.clone();
        Box::pin(async move {
            if let Err(e) = run_reminder_sweep(&deps, reminder_lead).await {
                tracing::error!("Reminder sweep failed: {}", e);
            }
        })
    })?;

    scheduler.add(reminder_job).await?;
    scheduler.start().await?;

    tracing::info!(
        lead_hours = reminder_lead.num_hours(),
        "Scheduled tasks started (event reminders every 15 minutes)"
    );
    Ok(scheduler)
}

async fn run_reminder_sweep(deps: &ServerDeps, lead: Duration) -> Result<()> {
    tracing::info!("Running event reminder sweep");

    let sent = event_actions::send_due_reminders(lead, deps).await?;

    tracing::info!(reminders_sent = sent, "Event reminder sweep complete");
    Ok(())
}
