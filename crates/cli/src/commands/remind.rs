//! One-off reminder sweep.
//!
//! Sends the same reminder the server scheduler sends at its daily time, to
//! every account with a push token and no entry for today.

use std::sync::Arc;

use tallybook_server::clock::SystemClock;
use tallybook_server::config::{PushGatewayConfig, ReminderConfig, database_url_from_env};
use tallybook_server::db;
use tallybook_server::services::{ReminderService, gateway_from_config};
use tracing::info;

/// Run the sweep now.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the candidate query fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = database_url_from_env()?;
    let push = PushGatewayConfig::from_env()?;

    let pool = db::create_pool(&database_url).await?;
    let gateway = gateway_from_config(push.as_ref())?;

    let service = ReminderService::new(
        pool,
        Arc::new(SystemClock),
        gateway,
        ReminderConfig::default().fire_at,
    );
    let sweep = service.run_once().await?;

    info!("Reminder sweep complete!");
    info!("  Candidates: {}", sweep.candidates);
    info!("  Sent: {}", sweep.sent);
    info!("  Failed: {}", sweep.failed);
    Ok(())
}
