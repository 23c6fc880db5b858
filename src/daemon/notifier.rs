use anyhow::Result;
use tracing::info;

use crate::{goal::display_ml, storage::entities::Settings};

pub const REMINDER_TITLE: &str = "Time to drink water!";

/// Title/body pair handed to whatever delivers the reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub title: String,
    pub body: String,
}

impl Reminder {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            title: REMINDER_TITLE.into(),
            body: format!(
                "Don't forget to hydrate. Your goal is {} ml, next reminder in {} hour(s).",
                display_ml(settings.goal_ml),
                settings.notification_interval_hours
            ),
        }
    }
}

/// Delivers reminders to the user. Platform notification centers can implement this, the daemon
/// only depends on the trait.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send {
    fn notify(&mut self, reminder: &Reminder) -> Result<()>;
}

/// Writes reminders to the log and stdout.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, reminder: &Reminder) -> Result<()> {
        info!(title = %reminder.title, "{}", reminder.body);
        println!("{}\n{}", reminder.title, reminder.body);
        Ok(())
    }
}
