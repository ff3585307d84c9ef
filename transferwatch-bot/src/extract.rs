//! HTML-structure extraction: reveal page markup to an [`Observation`].
//!
//! Pure over the HTML string so it can be exercised on fixtures without any
//! network. Placeholder "Default Player" rows (unrevealed slots) are dropped.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use transferwatch_core::{Gameweek, Observation, Snapshot, TransferPair};

/// Id of the tracked manager's section on the reveal page.
const TARGET_SECTION_ID: &str = "team2";

pub fn extract_observation(html: &str) -> Observation {
    let document = Html::parse_document(html);

    let section_selector =
        Selector::parse(&format!("div#{TARGET_SECTION_ID}")).expect("static selector");
    let Some(section) = document.select(&section_selector).next() else {
        warn!("Could not find the target manager's section on the reveal page");
        return Observation::GameweekUnknown;
    };

    let Some(gameweek) = extract_gameweek(section) else {
        warn!("Could not find the current gameweek header on the reveal page");
        return Observation::GameweekUnknown;
    };

    Observation::Snapshot(Snapshot {
        gameweek,
        chip: extract_chip(section),
        transfers: extract_transfers(section),
    })
}

fn extract_gameweek(section: ElementRef<'_>) -> Option<Gameweek> {
    let header_selector = Selector::parse("h3").expect("static selector");
    let gameweek_re = Regex::new(r"Gameweek (\d+)").expect("static regex");

    for header in section.select(&header_selector) {
        let text: String = header.text().collect();
        if let Some(captures) = gameweek_re.captures(&text) {
            if let Ok(number) = captures[1].parse::<u32>() {
                return Some(Gameweek(number));
            }
        }
    }
    None
}

fn extract_chip(section: ElementRef<'_>) -> Option<String> {
    let chip_selector =
        Selector::parse("li.rchip--active span.rchip__chip").expect("static selector");
    section.select(&chip_selector).next().map(|chip| {
        let text: String = chip.text().collect();
        text.trim().to_string()
    })
}

fn extract_transfers(section: ElementRef<'_>) -> Vec<TransferPair> {
    let item_selector =
        Selector::parse("ul.rtransfers__ul li.rtransfers__transfer").expect("static selector");
    let name_selector =
        Selector::parse("div.rtransfers__player p.rtransfers__name").expect("static selector");

    let mut transfers = Vec::new();
    for item in section.select(&item_selector) {
        let names: Vec<String> = item
            .select(&name_selector)
            .map(|name| name.text().collect::<String>().trim().to_string())
            .collect();

        // A revealed transfer row carries exactly an OUT name and an IN name.
        let [player_out, player_in] = names.as_slice() else {
            continue;
        };
        if player_out.contains("Default Player") || player_in.contains("Default Player") {
            continue;
        }
        transfers.push(TransferPair::new(player_out.clone(), player_in.clone()));
    }
    transfers
}
