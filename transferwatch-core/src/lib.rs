//! Pure reconciliation logic for the transfer watcher.
//!
//! This crate has no I/O: it defines the observed-snapshot and persisted-baseline
//! data model, the `reconcile` decision function that diffs one against the other,
//! and the rendering of a decision into a Telegram-ready message. Retrieval,
//! persistence and delivery all live in `transferwatch-bot`.

pub mod message;
pub mod reconcile;
pub mod snapshot;
pub mod state;

pub use message::{escape_markdown, render};
pub use reconcile::{reconcile, Outcome};
pub use snapshot::{Gameweek, Observation, Snapshot, TransferPair};
pub use state::PersistedState;
