use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::storage::{daily_store::DailyStateStore, entities::Settings};

use super::notifier::{Notifier, Reminder};

const SECONDS_IN_HOUR: u64 = 60 * 60;

pub fn reminder_interval(settings: &Settings) -> Duration {
    Duration::from_secs(u64::from(settings.notification_interval_hours) * SECONDS_IN_HOUR)
}

/// Periodically reminds the user to drink. Settings are never cached: the document is read again
/// on every wake, so changes made through the cli apply from the next reminder on.
pub struct ReminderModule {
    store: DailyStateStore,
    notifier: Box<dyn Notifier>,
    shutdown: CancellationToken,
}

impl ReminderModule {
    pub fn new(
        store: DailyStateStore,
        notifier: Box<dyn Notifier>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            notifier,
            shutdown,
        }
    }

    /// Executes the reminder event loop.
    pub async fn run(mut self) -> Result<()> {
        let mut settings = self.store.load().settings;
        loop {
            let wait = reminder_interval(&settings);
            debug!("Next reminder in {wait:?}");

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Stopping reminders");
                    return Ok(())
                }
                _ = self.store.clock().sleep(wait) => ()
            }

            settings = self.store.load().settings;
            let reminder = Reminder::from_settings(&settings);
            match self.notifier.notify(&reminder) {
                Ok(_) => info!("Sent reminder {:?}", reminder),
                Err(e) => error!("Failed to send reminder {e:?}"),
            }
        }
    }
}
