use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDateTime;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    daemon::shutdown::detect_shutdown,
    goal::{display_ml, expected_intake, progress_percentage, remaining_ml},
    storage::{daily_store::DailyStateStore, entities::AppState},
};

const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Text shown to the user about today's progress. All ml values are truncated.
pub fn render_status(state: &AppState, now: NaiveDateTime) -> String {
    let goal_ml = state.settings.goal_ml;
    let intake_ml = state.day(now.date()).intake_ml;
    let expected = expected_intake(now, goal_ml);

    let mut lines = vec![
        format!("By now you should have drunk: {} ml", display_ml(expected)),
        format!(
            "Today: {} / {} ml ({})",
            display_ml(intake_ml),
            display_ml(goal_ml),
            progress_percentage(intake_ml, goal_ml)
        ),
    ];

    if intake_ml >= goal_ml {
        lines.push("Goal met!".into());
    } else {
        lines.push(format!(
            "Remaining: {} ml",
            display_ml(remaining_ml(intake_ml, goal_ml))
        ));
        if intake_ml < expected {
            lines.push(format!(
                "Behind schedule by {} ml",
                display_ml(expected - intake_ml)
            ));
        }
    }

    lines.join("\n")
}

pub fn print_status(store: &DailyStateStore) {
    let state = store.load();
    println!("{}", render_status(&state, store.clock().local_time()));
}

/// Refreshes the status once per second until interrupted. Only reads the document, so it can
/// run next to other cli invocations and the daemon.
pub async fn watch_status(store: DailyStateStore) -> Result<()> {
    let shutdown = CancellationToken::new();
    let listener = tokio::spawn(detect_shutdown(shutdown.clone()));

    let mut refresh_point = store.clock().instant();
    loop {
        refresh_point += REFRESH_INTERVAL;
        debug!("Refreshing status");
        println!("{}\n", render_status(&store.load(), store.clock().local_time()));

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = store.clock().sleep_until(refresh_point) => ()
        }
    }

    listener.await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    use crate::storage::entities::AppState;

    use super::render_status;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 7, 4)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn status_in_the_middle_of_the_day() {
        let mut state = AppState::default();
        state.record_intake(1000.7, at(0, 0).date()).unwrap();

        assert_eq!(
            render_status(&state, at(15, 0)),
            "By now you should have drunk: 1250 ml\n\
             Today: 1000 / 2500 ml (40%)\n\
             Remaining: 1499 ml\n\
             Behind schedule by 249 ml"
        );
    }

    #[test]
    fn status_before_window_and_after_goal() {
        let mut state = AppState::default();
        assert_eq!(
            render_status(&state, at(7, 0)),
            "By now you should have drunk: 0 ml\n\
             Today: 0 / 2500 ml (0%)\n\
             Remaining: 2500 ml"
        );

        state.record_intake(2600., at(0, 0).date()).unwrap();
        assert_eq!(
            render_status(&state, at(23, 0)),
            "By now you should have drunk: 2500 ml\n\
             Today: 2600 / 2500 ml (104%)\n\
             Goal met!"
        );
    }

    #[test]
    fn yesterday_does_not_count_for_today() {
        let mut state = AppState::default();
        let yesterday = at(0, 0).date().pred_opt().unwrap();
        state.record_intake(2000., yesterday).unwrap();

        assert!(render_status(&state, at(12, 0)).contains("Today: 0 / 2500 ml"));
    }
}
