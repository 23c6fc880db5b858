//! Time-weighted daily goal. The goal is spread linearly over an active window of the day, so at
//! any moment there is an amount the user is expected to have drunk already.

use chrono::NaiveDateTime;

use crate::utils::{
    percentage::{ratio_percentage, Percentage},
    time::{at_hour, seconds_between},
};

/// Hour at which the active window opens, local time.
pub const WINDOW_START_HOUR: u32 = 8;
/// Hour at which the whole goal is due, local time.
pub const WINDOW_END_HOUR: u32 = 22;
/// Length of the active window. Daylight saving transitions are not taken into account.
pub const WINDOW_SECONDS: f64 = ((WINDOW_END_HOUR - WINDOW_START_HOUR) * 60 * 60) as f64;

/// Expected cumulative intake at `now` for a day with `goal_ml` as the target.
pub fn expected_intake(now: NaiveDateTime, goal_ml: f64) -> f64 {
    let date = now.date();
    let start = at_hour(date, WINDOW_START_HOUR);
    let end = at_hour(date, WINDOW_END_HOUR);

    if now < start {
        0.
    } else if now >= end {
        goal_ml
    } else {
        goal_ml * (seconds_between(start, now) / WINDOW_SECONDS)
    }
}

/// Presentation rule for ml values: drop the fractional part.
pub fn display_ml(value: f64) -> i64 {
    value.trunc() as i64
}

/// How much is still missing to reach the goal.
pub fn remaining_ml(intake_ml: f64, goal_ml: f64) -> f64 {
    (goal_ml - intake_ml).max(0.)
}

pub fn progress_percentage(intake_ml: f64, goal_ml: f64) -> Percentage {
    ratio_percentage(intake_ml, goal_ml)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    use super::{display_ml, expected_intake, remaining_ml, WINDOW_SECONDS};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 7, 4)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, m, s).unwrap())
    }

    #[test]
    fn window_is_fourteen_hours() {
        assert_eq!(WINDOW_SECONDS, 50400.);
    }

    #[test]
    fn nothing_expected_before_window() {
        for time in [at(0, 0, 0), at(5, 30, 0), at(7, 59, 59)] {
            assert_eq!(expected_intake(time, 2500.), 0.);
        }
    }

    #[test]
    fn whole_goal_due_after_window() {
        for time in [at(22, 0, 0), at(22, 0, 1), at(23, 59, 59)] {
            assert_eq!(expected_intake(time, 2500.), 2500.);
        }
    }

    #[test]
    fn linear_inside_window() {
        assert_eq!(expected_intake(at(8, 0, 0), 2500.), 0.);
        assert_eq!(expected_intake(at(15, 0, 0), 2500.), 1250.);
        assert_eq!(expected_intake(at(11, 30, 0), 1400.), 350.);
    }

    #[test]
    fn sub_second_precision_is_kept() {
        let time = NaiveDate::from_ymd_opt(2018, 7, 4)
            .unwrap()
            .and_time(NaiveTime::from_hms_milli_opt(8, 0, 0, 500).unwrap());
        assert!((expected_intake(time, 50400.) - 0.5).abs() < 1e-9);

        let time = NaiveDate::from_ymd_opt(2018, 7, 4)
            .unwrap()
            .and_time(NaiveTime::from_hms_micro_opt(8, 0, 0, 900).unwrap());
        let expected = expected_intake(time, 50400.);
        assert!(expected > 0.);
        assert!((expected - 0.0009).abs() < 1e-12);
    }

    #[test]
    fn display_truncates() {
        // 09:00 with 2500 ml gives 178.57... ml
        let value = expected_intake(at(9, 0, 0), 2500.);
        assert!(value > 178.5);
        assert_eq!(display_ml(value), 178);
        assert_eq!(display_ml(1249.99), 1249);
    }

    #[test]
    fn remaining_never_negative() {
        assert_eq!(remaining_ml(500., 2500.), 2000.);
        assert_eq!(remaining_ml(3000., 2500.), 0.);
    }
}
