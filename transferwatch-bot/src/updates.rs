//! Long-poll update loop and command dispatch: the bot's inbound surface.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use transferwatch_core::escape_markdown;

use crate::command::{parse_command, try_authorize_schedule, BotCommand, ParseResult};
use crate::telegram::{Message, Update};
use crate::{checker, scheduler, AppState};

const POLL_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Poll Telegram for updates and dispatch commands, forever.
pub async fn run_update_loop(state: Arc<AppState>) {
    let mut offset: Option<i64> = None;

    loop {
        match state.telegram.get_updates(offset, POLL_TIMEOUT).await {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    handle_update(&state, update).await;
                }
            }
            Err(e) => {
                error!("Failed to fetch updates: {:#}", e);
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}

async fn handle_update(state: &Arc<AppState>, update: Update) {
    let Some(message) = update.message else {
        return;
    };
    let Some(text) = message.text.clone() else {
        return;
    };
    let chat_id = message.chat.id;

    match parse_command(&text) {
        ParseResult::NoCommand => {}
        ParseResult::Unrecognized { attempted } => {
            info!("Unrecognized command {} in chat {}", attempted, chat_id);
            let reply = format!(
                "Unrecognized command: {}\nAvailable commands: /check, /start",
                attempted
            );
            send_plain_logged(state, chat_id, &reply).await;
        }
        ParseResult::Command(BotCommand::Check) => handle_check(state, chat_id).await,
        ParseResult::Command(BotCommand::Start) => handle_start(state, &message, chat_id).await,
    }
}

/// On-demand trigger: always replies with the rendered outcome, noteworthy
/// or not.
async fn handle_check(state: &Arc<AppState>, chat_id: i64) {
    info!("Received /check from chat {}", chat_id);
    send_plain_logged(state, chat_id, "\u{1f50e} Checking for new transfers...").await;

    match checker::run_check(state).await {
        Ok(report) => {
            if let Err(e) = state.telegram.send_markdown(chat_id, &report.text).await {
                error!("Failed to deliver check result: {:#}", e);
            }
        }
        Err(e) => {
            // Persistence failure: surface it rather than pretending the
            // check produced a result.
            error!("Check failed: {:#}", e);
            send_plain_logged(
                state,
                chat_id,
                "\u{26a0}\u{fe0f} Check failed: could not update saved state. See the bot logs.",
            )
            .await;
        }
    }
}

async fn handle_start(state: &Arc<AppState>, message: &Message, chat_id: i64) {
    let sender_id = message.from.as_ref().map(|user| user.id);
    info!("Received /start from user {:?} in chat {}", sender_id, chat_id);

    let authorized =
        sender_id.and_then(|id| try_authorize_schedule(id, state.config.admin_user_id));
    let Some(auth) = authorized else {
        send_plain_logged(
            state,
            chat_id,
            "\u{274c} Unauthorized: only the configured admin can schedule reports.",
        )
        .await;
        return;
    };

    scheduler::schedule_daily_report(state, chat_id, auth).await;

    let time = state.config.report_time.format("%H:%M").to_string();
    let confirmation = format!(
        "\u{2705} *Successfully Scheduled*\nI will send a daily transfer report to this chat \
         every day at *{} {}*\\. I will only message you if there are new transfers\\.",
        escape_markdown(&time),
        escape_markdown(&state.config.report_timezone.to_string()),
    );
    if let Err(e) = state.telegram.send_markdown(chat_id, &confirmation).await {
        error!("Failed to confirm scheduling: {:#}", e);
    }
}

async fn send_plain_logged(state: &Arc<AppState>, chat_id: i64, text: &str) {
    if let Err(e) = state.telegram.send_plain(chat_id, text).await {
        error!("Failed to send message to chat {}: {:#}", chat_id, e);
    }
}
