use std::sync::Arc;

use anyhow::Result;
use tracing::{info, Level};

use transferwatch_bot::config::Config;
use transferwatch_bot::{updates, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting transfer watch bot");

    let config = Config::from_env()?;
    info!("Using state file: {}", config.state_file.display());
    info!(
        "Daily report time: {} {}",
        config.report_time.format("%H:%M"),
        config.report_timezone
    );

    let state = Arc::new(AppState::new(config));
    updates::run_update_loop(state).await;

    Ok(())
}
