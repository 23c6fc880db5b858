use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::{
    fs::operations::{with_file_lock, write_atomic, LockMode},
    utils::clock::Clock,
};

use super::{entities::AppState, error::StoreError};

pub const DOCUMENT_NAME: &str = "waterlog.json";

/// The main realization of the persisted state. Holds the location of the document and the clock
/// deciding which day is "today".
pub struct DailyStateStore {
    path: PathBuf,
    clock: Box<dyn Clock>,
}

impl DailyStateStore {
    pub fn new(dir: PathBuf, clock: Box<dyn Clock>) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            path: dir.join(DOCUMENT_NAME),
            clock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Date of the active record.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Reads the persisted state. A missing or unreadable document results in defaults, the
    /// problem only ends up in the logs.
    #[instrument(skip(self), fields(path = ?self.path))]
    pub fn load(&self) -> AppState {
        let result = with_file_lock(&self.path, LockMode::Shared, || self.read_document());
        Self::recover(result)
    }

    /// Persists the whole state. `goal_met` of today's record and of every day logged to since
    /// the last save is recomputed with the goal in effect right now before writing.
    #[instrument(skip(self, state), fields(path = ?self.path))]
    pub fn save(&self, state: &mut AppState) -> Result<(), StoreError> {
        state.refresh_goal_met(self.today());
        with_file_lock(&self.path, LockMode::Exclusive, || self.write_document(state))
    }

    /// Load, add to today's record and save, all under one exclusive lock so that concurrent
    /// writers can't lose each other's intake.
    #[instrument(skip(self), fields(path = ?self.path))]
    pub fn log_intake(&self, amount_ml: f64) -> Result<AppState, StoreError> {
        let today = self.today();
        self.modify(|state| {
            let total = state.record_intake(amount_ml, today)?;
            info!("Logged {amount_ml} ml for {today}, total {total} ml");
            Ok(())
        })
    }

    /// Load, validate and apply new settings, then save.
    #[instrument(skip(self), fields(path = ?self.path))]
    pub fn update_settings(
        &self,
        goal_ml: f64,
        notification_interval_hours: u32,
    ) -> Result<AppState, StoreError> {
        self.modify(|state| {
            state.apply_settings(goal_ml, notification_interval_hours)?;
            info!("Settings changed to {:?}", state.settings);
            Ok(())
        })
    }

    fn modify(
        &self,
        change: impl FnOnce(&mut AppState) -> Result<(), StoreError>,
    ) -> Result<AppState, StoreError> {
        let today = self.today();
        with_file_lock(&self.path, LockMode::Exclusive, || {
            let mut state = Self::recover(self.read_document());
            change(&mut state)?;
            state.refresh_goal_met(today);
            self.write_document(&state)?;
            Ok(state)
        })
    }

    fn recover(result: Result<AppState, StoreError>) -> AppState {
        match result {
            Ok(state) => state,
            Err(e) => {
                // Might happen after a crash mid-write in older versions or a manual edit.
                warn!("Falling back to default state: {e}");
                AppState::default()
            }
        }
    }

    fn read_document(&self) -> Result<AppState, StoreError> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No document yet, using defaults");
                return Ok(AppState::default());
            }
            Err(e) => Err(e)?,
        };

        let state = serde_json::from_slice::<AppState>(&data)
            .map_err(|e| StoreError::CorruptDocument(e.to_string()))?;
        state.validate()?;
        Ok(state)
    }

    fn write_document(&self, state: &AppState) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(state)?;
        write_atomic(&self.path, &data)?;
        debug!("Saved {} day record(s)", state.history.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use tempfile::tempdir;

    use crate::{
        storage::{
            entities::{AppState, DayRecord, Settings},
            error::StoreError,
        },
        utils::{clock::FixedClock, logging::TEST_LOGGING},
    };

    use super::{DailyStateStore, DOCUMENT_NAME};

    fn test_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 7, 4).unwrap()
    }

    fn clock_at(date: NaiveDate, hour: u32) -> Box<FixedClock> {
        Box::new(FixedClock {
            local: NaiveDateTime::new(date, NaiveTime::from_hms_opt(hour, 0, 0).unwrap()),
        })
    }

    #[test]
    fn missing_document_gives_defaults() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let store = DailyStateStore::new(dir.path().to_owned(), clock_at(test_day(), 12))?;

        let state = store.load();

        assert_eq!(state.settings, Settings::default());
        assert!(state.history.is_empty());
        Ok(())
    }

    #[test]
    fn corrupted_document_gives_defaults() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let store = DailyStateStore::new(dir.path().to_owned(), clock_at(test_day(), 12))?;

        let broken = [
            "",
            "not json at all",
            r#"{"settings": {"goal_ml": 2000, "notification_interval_hours": 3}, "history": {"2018-07-04": {"intake_ml": 25"#,
            r#"{"settings": {"goal_ml": -5, "notification_interval_hours": 3}}"#,
            r#"{"settings": {"goal_ml": 2000, "notification_interval_hours": 0}}"#,
            r#"{"history": {"not a date": {"intake_ml": 1, "goal_met": false}}}"#,
            r#"{"history": {"2018-07-04": {"intake_ml": -100, "goal_met": false}}}"#,
        ];

        for content in broken {
            fs::write(dir.path().join(DOCUMENT_NAME), content)?;
            let state = store.load();
            assert_eq!(state, AppState::default(), "content {content:?}");
        }
        Ok(())
    }

    #[test]
    fn intake_round_trips() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let store = DailyStateStore::new(dir.path().to_owned(), clock_at(test_day(), 12))?;

        let mut state = store.load();
        state.record_intake(333.3, store.today())?;
        state.record_intake(0.1, store.today())?;
        let expected = state.day(test_day()).intake_ml;
        store.save(&mut state)?;

        let loaded = store.load();
        assert_eq!(loaded.day(test_day()).intake_ml, expected);
        assert_eq!(loaded, state);
        Ok(())
    }

    #[test]
    fn save_is_idempotent() -> Result<()> {
        let dir = tempdir()?;
        let store = DailyStateStore::new(dir.path().to_owned(), clock_at(test_day(), 12))?;

        let mut state = store.load();
        state.record_intake(500., test_day())?;
        store.save(&mut state)?;
        let first = fs::read(store.path())?;
        store.save(&mut state)?;
        store.save(&mut state)?;

        assert_eq!(fs::read(store.path())?, first);
        Ok(())
    }

    #[test]
    fn invalid_amount_leaves_document_unchanged() -> Result<()> {
        let dir = tempdir()?;
        let store = DailyStateStore::new(dir.path().to_owned(), clock_at(test_day(), 12))?;

        store.log_intake(400.)?;
        let before = fs::read(store.path())?;

        for amount in [-200., 0., f64::NAN] {
            let result = store.log_intake(amount);
            assert!(matches!(result, Err(StoreError::InvalidAmount(_))));
        }

        assert_eq!(fs::read(store.path())?, before);
        assert_eq!(store.load().day(test_day()).intake_ml, 400.);
        Ok(())
    }

    #[test]
    fn rollover_freezes_previous_day() -> Result<()> {
        let dir = tempdir()?;
        let next_day = test_day().succ_opt().unwrap();

        let store = DailyStateStore::new(dir.path().to_owned(), clock_at(test_day(), 21))?;
        store.log_intake(2000.)?;
        store.log_intake(600.)?;

        let store = DailyStateStore::new(dir.path().to_owned(), clock_at(next_day, 9))?;
        let state = store.log_intake(250.)?;

        assert_eq!(
            state.day(test_day()),
            DayRecord {
                intake_ml: 2600.,
                goal_met: true
            }
        );
        assert_eq!(
            state.day(next_day),
            DayRecord {
                intake_ml: 250.,
                goal_met: false
            }
        );
        assert_eq!(store.load(), state);
        Ok(())
    }

    #[test]
    fn save_after_midnight_refreshes_logged_day() -> Result<()> {
        let dir = tempdir()?;
        let next_day = test_day().succ_opt().unwrap();
        let store = DailyStateStore::new(dir.path().to_owned(), clock_at(test_day(), 23))?;
        let mut state = store.load();
        state.record_intake(2600., store.today())?;

        let late_store = DailyStateStore::new(
            dir.path().to_owned(),
            Box::new(FixedClock {
                local: NaiveDateTime::new(next_day, NaiveTime::from_hms_opt(0, 0, 1).unwrap()),
            }),
        )?;
        late_store.save(&mut state)?;

        assert_eq!(
            late_store.load().day(test_day()),
            DayRecord {
                intake_ml: 2600.,
                goal_met: true
            }
        );
        Ok(())
    }

    #[test]
    fn closed_day_leaves_document_unchanged() -> Result<()> {
        let dir = tempdir()?;
        let next_day = test_day().succ_opt().unwrap();
        DailyStateStore::new(dir.path().to_owned(), clock_at(next_day, 9))?.log_intake(300.)?;
        let store = DailyStateStore::new(dir.path().to_owned(), clock_at(test_day(), 22))?;
        let before = fs::read(store.path())?;

        let result = store.log_intake(100.);

        assert!(matches!(result, Err(StoreError::ClosedDay { .. })));
        assert_eq!(fs::read(store.path())?, before);
        Ok(())
    }

    #[test]
    fn goal_change_recomputes_only_today() -> Result<()> {
        let dir = tempdir()?;
        let next_day = test_day().succ_opt().unwrap();

        let store = DailyStateStore::new(dir.path().to_owned(), clock_at(test_day(), 20))?;
        store.log_intake(2000.)?;

        let store = DailyStateStore::new(dir.path().to_owned(), clock_at(next_day, 20))?;
        let state = store.log_intake(2000.)?;
        assert!(!state.day(next_day).goal_met);

        let mut state = store.load();
        state.apply_settings(1800., 2)?;
        store.save(&mut state)?;

        let loaded = store.load();
        assert!(loaded.day(next_day).goal_met);
        assert!(!loaded.day(test_day()).goal_met);

        let state = store.update_settings(2100., 3)?;
        assert!(!state.day(next_day).goal_met);
        assert_eq!(store.load().settings, Settings::new(2100., 3)?);
        Ok(())
    }

    #[test]
    fn invalid_settings_are_not_saved() -> Result<()> {
        let dir = tempdir()?;
        let store = DailyStateStore::new(dir.path().to_owned(), clock_at(test_day(), 12))?;
        store.update_settings(3000., 4)?;

        let result = store.update_settings(0., 4);

        assert!(matches!(result, Err(StoreError::InvalidSettings { .. })));
        assert_eq!(store.load().settings, Settings::new(3000., 4)?);
        Ok(())
    }
}
