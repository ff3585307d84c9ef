use anyhow::{Context, Result};
use chrono::NaiveTime;
use chrono_tz::Tz;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub fix_email: String,
    pub fix_password: String,
    /// Telegram user ID allowed to schedule the daily report.
    pub admin_user_id: i64,
    /// Path of the JSON state file holding the persisted baseline.
    pub state_file: PathBuf,
    /// Local time of day at which the scheduled report runs.
    pub report_time: NaiveTime,
    pub report_timezone: Tz,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .context("TELEGRAM_BOT_TOKEN environment variable is required")?;

        let fix_email =
            env::var("FIX_EMAIL").context("FIX_EMAIL environment variable is required")?;

        let fix_password =
            env::var("FIX_PASSWORD").context("FIX_PASSWORD environment variable is required")?;

        let admin_user_id = env::var("ADMIN_USER_ID")
            .context("ADMIN_USER_ID environment variable is required")?
            .parse::<i64>()
            .context("ADMIN_USER_ID must be a valid Telegram user ID")?;

        let state_file = env::var("STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("transfers.json"));

        let report_time = env::var("REPORT_TIME").unwrap_or_else(|_| "23:20".to_string());
        let report_time = NaiveTime::parse_from_str(&report_time, "%H:%M")
            .context("REPORT_TIME must be HH:MM")?;

        let report_timezone = env::var("REPORT_TIMEZONE")
            .unwrap_or_else(|_| "Asia/Singapore".to_string())
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("REPORT_TIMEZONE is not a valid IANA zone: {e}"))?;

        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("HTTP_TIMEOUT_SECS must be a valid number")?;

        Ok(Config {
            telegram_bot_token,
            fix_email,
            fix_password,
            admin_user_id,
            state_file,
            report_time,
            report_timezone,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}
