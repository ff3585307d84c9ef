//! End-to-end check cycle against fixture HTML and a real state file on disk:
//! everything except the network.

use transferwatch_bot::extract::extract_observation;
use transferwatch_bot::store::StateStore;
use transferwatch_core::{reconcile, render, Gameweek, Observation, Outcome, TransferPair};

fn reveal_page(gameweek: u32, transfers: &[(&str, &str)]) -> String {
    let items: String = transfers
        .iter()
        .map(|(out, inn)| {
            format!(
                r#"<li class="rtransfers__transfer">
                    <div class="rtransfers__player"><p class="rtransfers__name">{out}</p></div>
                    <div class="rtransfers__player"><p class="rtransfers__name">{inn}</p></div>
                </li>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="team2">
        <h3>Gameweek {gameweek}</h3>
        <ul class="rtransfers__ul">{items}</ul>
        </div></body></html>"#
    )
}

/// Run one check cycle against fixture HTML, persisting like the real checker.
fn check(store: &StateStore, html: &str) -> Outcome {
    let observation = extract_observation(html);
    let persisted = store.load();
    let (outcome, next) = reconcile(observation, &persisted);
    if let Some(next) = next {
        store.save(&next).expect("baseline write");
    }
    outcome
}

#[test]
fn first_check_rolls_over_then_repeat_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("transfers.json"));

    let page = reveal_page(5, &[("Salah", "Haaland")]);

    let first = check(&store, &page);
    assert!(first.is_noteworthy());
    assert!(matches!(first, Outcome::GameweekRolledOver { .. }));

    // Same page again: the freshly persisted baseline absorbs it.
    let second = check(&store, &page);
    assert_eq!(
        second,
        Outcome::NoNewTransfers {
            gameweek: Gameweek(5)
        }
    );
}

#[test]
fn new_transfer_mid_gameweek_reports_only_the_delta() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("transfers.json"));

    check(&store, &reveal_page(5, &[("Salah", "Haaland")]));
    let outcome = check(
        &store,
        &reveal_page(5, &[("Salah", "Haaland"), ("Saka", "Palmer")]),
    );

    assert_eq!(
        outcome,
        Outcome::NewTransfersFound {
            gameweek: Gameweek(5),
            new_transfers: vec![TransferPair::new("Saka", "Palmer")],
            chip: None,
        }
    );

    // The baseline on disk holds the full set, not the delta.
    let persisted = store.load();
    assert_eq!(
        persisted.transfers,
        vec![
            TransferPair::new("Salah", "Haaland"),
            TransferPair::new("Saka", "Palmer"),
        ]
    );
}

#[test]
fn gameweek_rollover_resets_the_baseline_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("transfers.json"));

    check(&store, &reveal_page(5, &[("Salah", "Haaland")]));
    let outcome = check(&store, &reveal_page(6, &[("Maddison", "Isak")]));

    assert!(outcome.is_noteworthy());
    let persisted = store.load();
    assert_eq!(persisted.gameweek, Some(Gameweek(6)));
    assert_eq!(persisted.transfers, vec![TransferPair::new("Maddison", "Isak")]);
}

#[test]
fn broken_page_leaves_the_baseline_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("transfers.json"));

    check(&store, &reveal_page(5, &[("Salah", "Haaland")]));
    let before = store.load();

    let outcome = check(&store, "<html><body>maintenance</body></html>");
    assert_eq!(outcome, Outcome::ExtractionFailed);
    assert!(!outcome.is_noteworthy());
    assert_eq!(store.load(), before);
}

#[test]
fn legacy_state_file_behaves_like_a_first_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transfers.json");
    std::fs::write(&path, r#"[["Old","Format"]]"#).unwrap();

    let store = StateStore::new(path);
    let outcome = check(&store, &reveal_page(8, &[("Salah", "Haaland")]));

    // The legacy shape reads as absent state, so this is a rollover.
    assert!(matches!(
        outcome,
        Outcome::GameweekRolledOver {
            gameweek: Gameweek(8),
            ..
        }
    ));
}

#[test]
fn rendered_report_matches_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("transfers.json"));

    check(&store, &reveal_page(5, &[("Salah", "Haaland")]));
    let outcome = check(
        &store,
        &reveal_page(5, &[("Salah", "Haaland"), ("N. Jackson", "G. Jesus")]),
    );

    let text = render(&outcome);
    assert!(text.contains("New Transfers Detected for GW 5"));
    assert!(text.contains("OUT: `N\\. Jackson`"));
    assert!(text.contains("IN: `G\\. Jesus`"));
    assert!(!text.contains("`Salah`"), "already-seen pair must not re-alert");
}

#[test]
fn unavailable_source_never_writes_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("transfers.json"));

    let persisted = store.load();
    let (outcome, next) = reconcile(Observation::Unavailable, &persisted);
    assert_eq!(outcome, Outcome::LoginFailed);
    assert!(next.is_none());
    assert!(!dir.path().join("transfers.json").exists());
}

#[test]
fn failed_baseline_write_produces_no_report() {
    let store = StateStore::new("/nonexistent-dir/transfers.json".into());

    let observation = extract_observation(&reveal_page(5, &[("Salah", "Haaland")]));
    let persisted = store.load();
    let (outcome, next) = reconcile(observation, &persisted);

    // The baseline write comes before any report is rendered. With an
    // unwritable state path the cycle stops here and nothing is delivered.
    let next = next.expect("a fresh gameweek rewrites the baseline");
    assert!(store.save(&next).is_err());
    assert!(outcome.is_noteworthy(), "the lost report was a real one");
}
