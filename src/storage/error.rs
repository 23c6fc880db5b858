use chrono::NaiveDate;
use thiserror::Error;

/// Errors of the daily state store. None of them is fatal: invalid input is rejected with state
/// left as it was, and a corrupted document is replaced with defaults on load.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Intake must be a finite amount above zero
    #[error("Invalid amount {0}, expected a positive number of ml")]
    InvalidAmount(f64),

    /// Goal must be a finite amount above zero and the interval at least one hour
    #[error("Invalid settings: goal {goal_ml} ml, reminder every {notification_interval_hours} hour(s)")]
    InvalidSettings {
        goal_ml: f64,
        notification_interval_hours: u32,
    },

    /// Intake can only go to the newest day, earlier days are closed once a later one exists
    #[error("Day {date} is closed, intake is already being logged for {active}")]
    ClosedDay { date: NaiveDate, active: NaiveDate },

    /// Persisted document can't be parsed or holds values that can't be valid
    #[error("Persisted document is corrupted: {0}")]
    CorruptDocument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
