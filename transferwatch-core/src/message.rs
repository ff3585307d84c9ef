//! Rendering of reconciliation outcomes into Telegram MarkdownV2 text.
//!
//! All escaping lives here, parameterized by the fixed reserved-character set
//! of the target renderer, so a renderer change never touches the engine.

use crate::reconcile::Outcome;
use crate::snapshot::TransferPair;

/// Characters reserved by Telegram MarkdownV2. Each occurrence in opaque text
/// (player names, chip names) must be prefixed with a backslash.
const MARKDOWN_RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escape MarkdownV2-reserved characters, character by character.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Render an outcome as a MarkdownV2 message.
///
/// Pure: one branch per variant, no failure modes. Whether the text should
/// actually be delivered is [`Outcome::is_noteworthy`]'s concern.
pub fn render(outcome: &Outcome) -> String {
    match outcome {
        Outcome::LoginFailed => {
            "\u{274c} *Login Failed*\nCould not log in to Fantasy Football Fix\\.".to_string()
        }
        Outcome::ExtractionFailed => {
            "\u{26a0}\u{fe0f} *Scraping Error*\nCould not find the current gameweek\\.".to_string()
        }
        Outcome::GameweekRolledOver {
            gameweek,
            transfers,
            chip,
        } => {
            if transfers.is_empty() {
                format!(
                    "Gameweek has updated to *GW {}*\\. No transfers made yet\\.",
                    gameweek
                )
            } else {
                let mut message = format!(
                    "\u{1f680} *First Transfers for GW {} Detected* \u{1f680}\n\n",
                    gameweek
                );
                push_chip_line(&mut message, chip.as_deref());
                push_transfer_lines(&mut message, transfers);
                message
            }
        }
        Outcome::NoNewTransfers { gameweek } => {
            format!(
                "\u{2705} *No new transfers for GW {}* since the last check\\.",
                gameweek
            )
        }
        Outcome::NewTransfersFound {
            gameweek,
            new_transfers,
            chip,
        } => {
            let mut message = format!(
                "\u{1f6a8} *New Transfers Detected for GW {}* \u{1f6a8}\n\n",
                gameweek
            );
            push_chip_line(&mut message, chip.as_deref());
            message.push_str("*New Transfers:*\n\n");
            push_transfer_lines(&mut message, new_transfers);
            message
        }
    }
}

fn push_chip_line(message: &mut String, chip: Option<&str>) {
    message.push_str(&format!(
        "Chip Active: *{}*\n\n",
        escape_markdown(chip.unwrap_or("None"))
    ));
}

fn push_transfer_lines(message: &mut String, transfers: &[TransferPair]) {
    for pair in transfers {
        message.push_str(&format!(
            "\u{1f534} OUT: `{}`\n\u{1f7e2} IN: `{}`\n\n",
            escape_markdown(&pair.player_out),
            escape_markdown(&pair.player_in)
        ));
    }
}
