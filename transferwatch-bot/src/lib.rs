pub mod checker;
pub mod command;
pub mod config;
pub mod extract;
pub mod fix;
pub mod scheduler;
pub mod store;
pub mod telegram;
pub mod updates;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::fix::FixClient;
use crate::store::StateStore;
use crate::telegram::TelegramClient;

/// Shared state for the running bot.
pub struct AppState {
    pub config: Config,
    pub fix_client: FixClient,
    pub telegram: TelegramClient,
    pub store: StateStore,
    /// Serializes the whole read-decide-write check cycle: the scheduled
    /// trigger and the on-demand `/check` trigger may race, and at most one
    /// reconciliation may be in flight at a time.
    pub check_lock: Mutex<()>,
    /// Handle of the currently scheduled daily report task, if any.
    /// Rescheduling aborts the previous task before spawning the new one.
    pub daily_job: Mutex<Option<JoinHandle<()>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let fix_client = FixClient::new(
            config.fix_email.clone(),
            config.fix_password.clone(),
            config.http_timeout,
        );
        let telegram = TelegramClient::new(config.telegram_bot_token.clone(), config.http_timeout);
        let store = StateStore::new(config.state_file.clone());

        Self {
            config,
            fix_client,
            telegram,
            store,
            check_lock: Mutex::new(()),
            daily_job: Mutex::new(None),
        }
    }
}
