use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    goal::display_ml,
    storage::{daily_store::DailyStateStore, entities::AppState},
    utils::time::date_to_record_name,
};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct HistoryCommand {
    #[arg(
        long,
        short,
        default_value_t = 7,
        help = "Number of days to show, today included"
    )]
    days: u32,
    #[arg(
        long,
        short,
        help = "Show everything since this date. Examples are \"yesterday\", \"last week\", \"15/03/2025\". Overrides --days"
    )]
    since: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Prints stored day records, newest first.
pub fn process_history_command(
    HistoryCommand {
        days,
        since,
        date_style,
    }: HistoryCommand,
    store: &DailyStateStore,
) -> Result<()> {
    let today = store.today();
    let start = match since {
        Some(since) => parse_since(
            &since,
            date_style,
            store.clock().time().with_timezone(&Local),
        )?,
        None => days_back(today, days),
    };

    let lines = render_history(&store.load(), start, today);
    if lines.is_empty() {
        println!("Nothing logged since {}", date_to_record_name(start));
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Human readable date relative to `now`, which comes from the store clock.
fn parse_since(since: &str, date_style: DateStyle, now: DateTime<Local>) -> Result<NaiveDate> {
    match parse_date_string(since, now, date_style.into()) {
        Ok(v) => Ok(v.date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate since date {e}"),
            )
            .into()),
    }
}

/// First day of a range of `days` days ending with `today`.
fn days_back(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(chrono::Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN)
}

/// One line per stored day between `start` and `end` (both inclusive).
fn render_history(state: &AppState, start: NaiveDate, end: NaiveDate) -> Vec<String> {
    if start > end {
        return vec![];
    }
    state
        .history
        .range(start..=end)
        .rev()
        .map(|(date, record)| {
            format!(
                "{}\t{} ml\t{}",
                date_to_record_name(*date),
                display_ml(record.intake_ml),
                if record.goal_met { "met" } else { "not met" }
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone};

    use crate::storage::entities::AppState;

    use super::{days_back, parse_since, render_history, DateStyle};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 7, d).unwrap()
    }

    #[test]
    fn days_back_includes_today() {
        assert_eq!(days_back(day(10), 7), day(4));
        assert_eq!(days_back(day(10), 1), day(10));
        assert_eq!(days_back(day(10), 0), day(10));
    }

    #[test]
    fn since_is_relative_to_given_now() {
        let now = Local.with_ymd_and_hms(2018, 7, 10, 12, 0, 0).unwrap();

        assert_eq!(parse_since("yesterday", DateStyle::Uk, now).unwrap(), day(9));
        assert_eq!(parse_since("04/07/2018", DateStyle::Uk, now).unwrap(), day(4));
        assert_eq!(parse_since("07/04/2018", DateStyle::Us, now).unwrap(), day(4));
        assert!(parse_since("not a date", DateStyle::Uk, now).is_err());
    }

    #[test]
    fn history_is_newest_first_and_bounded() {
        let mut state = AppState::default();
        state.record_intake(100., day(1)).unwrap();
        state.record_intake(2600.9, day(4)).unwrap();
        state.record_intake(800., day(6)).unwrap();
        state.refresh_goal_met(day(4));

        assert_eq!(
            render_history(&state, day(3), day(6)),
            vec!["2018-07-06\t800 ml\tnot met", "2018-07-04\t2600 ml\tmet"]
        );
        assert!(render_history(&state, day(6), day(3)).is_empty());
    }
}
