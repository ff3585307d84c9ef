use std::collections::HashSet;

use crate::snapshot::{Gameweek, Observation, Snapshot, TransferPair};
use crate::state::PersistedState;

/// The decision produced by one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The upstream source could not be reached or authenticated.
    LoginFailed,
    /// The page was retrieved but its expected structure was absent.
    ExtractionFailed,
    /// The observed gameweek differs from the persisted one. This includes the
    /// very first run, where nothing is persisted yet.
    GameweekRolledOver {
        gameweek: Gameweek,
        transfers: Vec<TransferPair>,
        chip: Option<String>,
    },
    /// Same gameweek, nothing beyond what the baseline already holds.
    NoNewTransfers { gameweek: Gameweek },
    /// Same gameweek, with transfers not present in the baseline.
    NewTransfersFound {
        gameweek: Gameweek,
        new_transfers: Vec<TransferPair>,
        chip: Option<String>,
    },
}

impl Outcome {
    /// Whether this outcome warrants active delivery, as opposed to a
    /// logged-only result. The scheduled trigger delivers only noteworthy
    /// outcomes; the on-demand trigger always shows the rendered text.
    ///
    /// A rollover to a gameweek with no transfers yet is reported but not
    /// flagged for delivery.
    pub fn is_noteworthy(&self) -> bool {
        match self {
            Outcome::NewTransfersFound { .. } => true,
            Outcome::GameweekRolledOver { transfers, .. } => !transfers.is_empty(),
            Outcome::LoginFailed | Outcome::ExtractionFailed | Outcome::NoNewTransfers { .. } => {
                false
            }
        }
    }
}

/// Diff a fresh observation against the persisted baseline.
///
/// Returns the outcome together with the baseline to persist going forward;
/// `None` means the baseline must be left untouched. The caller is responsible
/// for writing the returned state before acting on the outcome, so that a
/// failed write never produces a notification the next run cannot account for.
///
/// Properties:
/// - A gameweek change always rewrites the baseline to the full observed set,
///   even when that set is empty.
/// - Within a gameweek, the new baseline is the *full* current set rather than
///   the delta, so already-seen pairs are never re-reported even if the source
///   reorders or partially repeats them.
/// - Running the same observation twice in a row (feeding the first call's
///   output state into the second) is never noteworthy the second time.
pub fn reconcile(
    observation: Observation,
    persisted: &PersistedState,
) -> (Outcome, Option<PersistedState>) {
    let snapshot = match observation {
        Observation::Unavailable => return (Outcome::LoginFailed, None),
        Observation::GameweekUnknown => return (Outcome::ExtractionFailed, None),
        Observation::Snapshot(snapshot) => snapshot,
    };

    let Snapshot {
        gameweek,
        chip,
        transfers,
    } = snapshot;

    // Collapse duplicates while keeping page discovery order for display.
    let transfers = dedup_preserving_order(transfers);

    if persisted.gameweek != Some(gameweek) {
        let next = PersistedState::new(gameweek, transfers.clone());
        let outcome = Outcome::GameweekRolledOver {
            gameweek,
            transfers,
            chip,
        };
        return (outcome, Some(next));
    }

    let seen: HashSet<&TransferPair> = persisted.transfers.iter().collect();
    let new_transfers: Vec<TransferPair> = transfers
        .iter()
        .filter(|pair| !seen.contains(pair))
        .cloned()
        .collect();

    if new_transfers.is_empty() {
        return (Outcome::NoNewTransfers { gameweek }, None);
    }

    let next = PersistedState::new(gameweek, transfers);
    let outcome = Outcome::NewTransfersFound {
        gameweek,
        new_transfers,
        chip,
    };
    (outcome, Some(next))
}

fn dedup_preserving_order(transfers: Vec<TransferPair>) -> Vec<TransferPair> {
    let mut seen = HashSet::with_capacity(transfers.len());
    transfers
        .into_iter()
        .filter(|pair| seen.insert(pair.clone()))
        .collect()
}
