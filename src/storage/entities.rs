use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::StoreError;

pub const DEFAULT_GOAL_ML: f64 = 2500.;
pub const DEFAULT_NOTIFICATION_INTERVAL_HOURS: u32 = 2;

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Copy)]
pub struct Settings {
    /// Daily target in milliliters
    pub goal_ml: f64,
    /// Hours between two reminders
    pub notification_interval_hours: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            goal_ml: DEFAULT_GOAL_ML,
            notification_interval_hours: DEFAULT_NOTIFICATION_INTERVAL_HOURS,
        }
    }
}

impl Settings {
    pub fn new(goal_ml: f64, notification_interval_hours: u32) -> Result<Self, StoreError> {
        if !goal_ml.is_finite() || goal_ml <= 0. || notification_interval_hours == 0 {
            return Err(StoreError::InvalidSettings {
                goal_ml,
                notification_interval_hours,
            });
        }
        Ok(Self {
            goal_ml,
            notification_interval_hours,
        })
    }
}

/// Intake for a single calendar day.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Copy, Default)]
pub struct DayRecord {
    pub intake_ml: f64,
    /// Derived from `intake_ml` and the goal every time the day is saved
    pub goal_met: bool,
}

/// Day records keyed by local date. Serialized with `YYYY-MM-DD` keys.
pub type HistoryStore = BTreeMap<NaiveDate, DayRecord>;

/// Everything the application persists. This is also the shape of the JSON document.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppState {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub history: HistoryStore,
    /// Days changed by [AppState::record_intake] since the last save
    #[serde(skip)]
    touched: BTreeSet<NaiveDate>,
}

impl AppState {
    /// Adds `amount_ml` to the record of `at`, starting a fresh record when the date is new.
    /// Days before the newest stored one are frozen. Returns the new total for `at`.
    pub fn record_intake(&mut self, amount_ml: f64, at: NaiveDate) -> Result<f64, StoreError> {
        if !amount_ml.is_finite() || amount_ml <= 0. {
            return Err(StoreError::InvalidAmount(amount_ml));
        }
        if let Some(active) = self.latest_day().filter(|active| at < *active) {
            return Err(StoreError::ClosedDay { date: at, active });
        }
        let record = self.history.entry(at).or_default();
        record.intake_ml += amount_ml;
        self.touched.insert(at);
        Ok(record.intake_ml)
    }

    /// Newest day with a record.
    pub fn latest_day(&self) -> Option<NaiveDate> {
        self.history.keys().next_back().copied()
    }

    /// Replaces settings after validating them. History isn't affected until the next save.
    pub fn apply_settings(
        &mut self,
        goal_ml: f64,
        notification_interval_hours: u32,
    ) -> Result<(), StoreError> {
        self.settings = Settings::new(goal_ml, notification_interval_hours)?;
        Ok(())
    }

    /// Recomputes `goal_met` of the active day and of every day intake went to since the last
    /// save, with the goal currently in effect even if the ml were logged under a different goal.
    /// Other past days keep the flag they were saved with.
    pub fn refresh_goal_met(&mut self, today: NaiveDate) {
        let goal_ml = self.settings.goal_ml;
        self.touched.insert(today);
        for date in std::mem::take(&mut self.touched) {
            if let Some(record) = self.history.get_mut(&date) {
                record.goal_met = record.intake_ml >= goal_ml;
            }
        }
    }

    /// Record for `date`, or an empty one if nothing was logged that day.
    pub fn day(&self, date: NaiveDate) -> DayRecord {
        self.history.get(&date).copied().unwrap_or_default()
    }

    /// Checks values of a loaded document serde can't check by itself.
    pub fn validate(&self) -> Result<(), StoreError> {
        Settings::new(
            self.settings.goal_ml,
            self.settings.notification_interval_hours,
        )
        .map_err(|e| StoreError::CorruptDocument(e.to_string()))?;
        if let Some((date, record)) = self
            .history
            .iter()
            .find(|(_, v)| !v.intake_ml.is_finite() || v.intake_ml < 0.)
        {
            return Err(StoreError::CorruptDocument(format!(
                "intake of {date} is {} ml",
                record.intake_ml
            )));
        }
        Ok(())
    }
}
