//! Scheduled daily report task.
//!
//! One chat at a time can hold the daily report; `/start` installs it and a
//! later `/start` replaces it. The task sleeps until the configured local
//! time, runs a check, and delivers only when the outcome is noteworthy.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::checker;
use crate::command::AuthorizedSchedule;
use crate::AppState;

/// Install the daily report for `chat_id`, replacing any previous job.
///
/// Requires an [`AuthorizedSchedule`], so unauthenticated callers cannot
/// reach this function.
pub async fn schedule_daily_report(state: &Arc<AppState>, chat_id: i64, _auth: AuthorizedSchedule) {
    let mut job = state.daily_job.lock().await;
    if let Some(previous) = job.take() {
        previous.abort();
        info!("Replaced previously scheduled daily report");
    }
    *job = Some(spawn_daily_loop(state.clone(), chat_id));
}

fn spawn_daily_loop(state: Arc<AppState>, chat_id: i64) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let tz = state.config.report_timezone;
            let now = Utc::now().with_timezone(&tz);
            let next = next_occurrence(now, state.config.report_time);
            info!("Next daily report for chat {} at {}", chat_id, next);

            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(wait).await;

            info!("Running scheduled daily report for chat {}", chat_id);
            match checker::run_check(&state).await {
                Ok(report) if report.noteworthy => {
                    if let Err(e) = state.telegram.send_markdown(chat_id, &report.text).await {
                        error!("Failed to deliver daily report: {:#}", e);
                    }
                }
                Ok(_) => {
                    info!("Scheduled check complete; nothing noteworthy, staying silent");
                }
                Err(e) => {
                    error!("Scheduled check failed: {:#}", e);
                }
            }
        }
    })
}

/// The next time `report_time` occurs in `now`'s timezone, strictly after
/// `now`. Skips local times that do not exist (DST gaps).
fn next_occurrence(now: DateTime<Tz>, report_time: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    for days in 0..=2 {
        let date = now.date_naive() + TimeDelta::days(days);
        let Some(candidate) = tz.from_local_datetime(&date.and_time(report_time)).earliest()
        else {
            continue;
        };
        if candidate > now {
            return candidate;
        }
    }
    now + TimeDelta::days(1)
}
