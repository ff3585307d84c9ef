//! JSON-file state store for the persisted baseline.
//!
//! Load failures (missing file, corrupt JSON, legacy shapes such as the old
//! bare-array format) degrade to the default empty state: a one-way, logged
//! migration. Save failures are errors the caller must not swallow, since a
//! stale baseline would re-diff old pairs and re-alert on them.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use transferwatch_core::PersistedState;

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the persisted baseline, or the default empty state when the file
    /// is absent or unreadable.
    pub fn load(&self) -> PersistedState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No state file at {}; starting fresh", self.path.display());
                return PersistedState::default();
            }
            Err(e) => {
                warn!(
                    "Could not read state file {}: {}; starting fresh",
                    self.path.display(),
                    e
                );
                return PersistedState::default();
            }
        };

        match serde_json::from_str::<PersistedState>(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    "Unrecognized state file format in {} ({}); starting fresh",
                    self.path.display(),
                    e
                );
                PersistedState::default()
            }
        }
    }

    /// Replace the persisted baseline wholesale.
    ///
    /// Writes to a temporary file in the same directory and renames it into
    /// place, so a reader never observes a half-written document.
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        let json =
            serde_json::to_string_pretty(state).context("Failed to serialize persisted state")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write state file {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace state file {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transferwatch_core::{Gameweek, TransferPair};

    fn store_in(dir: &tempfile::TempDir) -> StateStore {
        StateStore::new(dir.path().join("transfers.json"))
    }

    #[test]
    fn test_missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load(), PersistedState::default());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let state = PersistedState::new(
            Gameweek(5),
            vec![
                TransferPair::new("X", "Y"),
                TransferPair::new("P", "Q"),
            ],
        );
        store.save(&state).unwrap();
        assert_eq!(store.load(), state);
    }

    #[test]
    fn test_save_replaces_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .save(&PersistedState::new(
                Gameweek(5),
                vec![TransferPair::new("X", "Y")],
            ))
            .unwrap();
        let next = PersistedState::new(Gameweek(6), vec![TransferPair::new("M", "N")]);
        store.save(&next).unwrap();

        assert_eq!(store.load(), next);
    }

    #[test]
    fn test_legacy_bare_array_resets_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        fs::write(dir.path().join("transfers.json"), r#"[["X","Y"]]"#).unwrap();
        assert_eq!(store.load(), PersistedState::default());
    }

    #[test]
    fn test_document_missing_a_key_resets_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        fs::write(dir.path().join("transfers.json"), r#"{"gameweek": 5}"#).unwrap();
        assert_eq!(store.load(), PersistedState::default());

        fs::write(
            dir.path().join("transfers.json"),
            r#"{"transfers": [["X","Y"]]}"#,
        )
        .unwrap();
        assert_eq!(store.load(), PersistedState::default());
    }

    #[test]
    fn test_corrupt_json_resets_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        fs::write(dir.path().join("transfers.json"), "not json {{{").unwrap();
        assert_eq!(store.load(), PersistedState::default());
    }

    #[test]
    fn test_save_to_unwritable_path_is_an_error() {
        let store = StateStore::new(PathBuf::from("/nonexistent-dir/transfers.json"));
        let result = store.save(&PersistedState::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_null_gameweek_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&PersistedState::default()).unwrap();
        let raw = fs::read_to_string(dir.path().join("transfers.json")).unwrap();
        assert!(raw.contains("\"gameweek\": null"));
        assert_eq!(store.load(), PersistedState::default());
    }
}
