use std::fmt;

use serde::{Deserialize, Serialize};

/// Gameweek number as shown on the reveal page.
///
/// Only equality matters to reconciliation: a gameweek that differs from the
/// persisted one is a rollover, whichever direction it moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gameweek(pub u32);

impl fmt::Display for Gameweek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One transfer event: the player moved out and the player brought in.
///
/// The pair is ordered internally, so `(A, B)` and `(B, A)` are distinct
/// transfers and may coexist within one gameweek. On the wire this is the
/// two-element array `[out, in]` used by the state file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct TransferPair {
    pub player_out: String,
    pub player_in: String,
}

impl TransferPair {
    pub fn new(player_out: impl Into<String>, player_in: impl Into<String>) -> Self {
        Self {
            player_out: player_out.into(),
            player_in: player_in.into(),
        }
    }
}

impl From<(String, String)> for TransferPair {
    fn from((player_out, player_in): (String, String)) -> Self {
        Self {
            player_out,
            player_in,
        }
    }
}

impl From<TransferPair> for (String, String) {
    fn from(pair: TransferPair) -> Self {
        (pair.player_out, pair.player_in)
    }
}

/// A successfully extracted view of the reveal page.
///
/// `transfers` keeps page discovery order for display; reconciliation treats it
/// as a set (duplicates collapse, order is irrelevant to equality).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub gameweek: Gameweek,
    /// Active chip name, if one is played this gameweek. Surfaced in
    /// notifications only; never persisted or diffed.
    pub chip: Option<String>,
    pub transfers: Vec<TransferPair>,
}

/// What a single check of the upstream page produced.
///
/// The two failure variants are distinct conditions, not empty snapshots: they
/// must leave the persisted baseline untouched so the next successful check
/// still compares against the last good state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Login or page retrieval failed; the source was never read.
    Unavailable,
    /// The page was retrieved but the current gameweek could not be found.
    GameweekUnknown,
    /// The page was retrieved and parsed.
    Snapshot(Snapshot),
}
