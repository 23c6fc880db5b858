use std::path::PathBuf;

use anyhow::Result;
use notifier::{LogNotifier, Notifier};
use reminder::ReminderModule;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    storage::daily_store::DailyStateStore,
    utils::clock::{Clock, DefaultClock},
};

pub mod args;
pub mod notifier;
pub mod reminder;
pub mod shutdown;

/// Represents the starting point for the daemon
pub async fn start_daemon(dir: PathBuf) -> Result<()> {
    let dir = std::path::absolute(dir)?;
    std::env::set_current_dir("/")?;

    let shutdown_token = CancellationToken::new();

    let reminder = create_reminder(dir, Box::new(LogNotifier), &shutdown_token, DefaultClock)?;

    info!("Reminder daemon started");
    let (_, reminder_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        reminder.run(),
    );

    if let Err(reminder_result) = &reminder_result {
        error!("Reminder module got an error {:?}", reminder_result);
    }

    reminder_result
}

fn create_reminder(
    dir: PathBuf,
    notifier: Box<dyn Notifier>,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
) -> Result<ReminderModule> {
    let store = DailyStateStore::new(dir, Box::new(clock))?;
    Ok(ReminderModule::new(store, notifier, shutdown_token.clone()))
}
