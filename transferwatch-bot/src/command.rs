//! Command parsing for incoming Telegram messages.

/// A recognized bot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// Schedule (or reschedule) the daily report for the sending chat.
    Start,
    /// Run an on-demand check and reply with the result.
    Check,
}

/// Result of parsing a message for bot commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    /// The message is not addressed to the bot (no leading `/`).
    NoCommand,
    /// The message looks like a command but is not one we know.
    Unrecognized { attempted: String },
    /// A valid command was found.
    Command(BotCommand),
}

/// A schedule request that has been verified to come from the admin user.
///
/// This type can only be constructed via [`try_authorize_schedule`], which
/// requires the sender's user ID to match the configured admin. Functions that
/// install the daily report job take this type, making it a compile-time error
/// to skip the authorization check.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizedSchedule(());

/// Try to authorize a `/start` schedule request.
///
/// Returns `Some` only if the sender is the configured admin user. This is
/// the only constructor of [`AuthorizedSchedule`].
pub fn try_authorize_schedule(sender_id: i64, admin_user_id: i64) -> Option<AuthorizedSchedule> {
    if sender_id == admin_user_id {
        Some(AuthorizedSchedule(()))
    } else {
        None
    }
}

/// Parse a message body for a bot command.
///
/// Telegram commands are the first whitespace-delimited token of the message,
/// starting with `/`, optionally suffixed with `@botname` in group chats.
/// Matching is case-insensitive; trailing arguments are ignored.
pub fn parse_command(text: &str) -> ParseResult {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return ParseResult::NoCommand;
    }

    let token = trimmed.split_whitespace().next().unwrap_or(trimmed);
    let name = token.split('@').next().unwrap_or(token);

    match name.to_lowercase().as_str() {
        "/start" => ParseResult::Command(BotCommand::Start),
        "/check" => ParseResult::Command(BotCommand::Check),
        _ => ParseResult::Unrecognized {
            attempted: token.to_string(),
        },
    }
}
