use serde::{Deserialize, Serialize};

use crate::snapshot::{Gameweek, TransferPair};

/// The durable baseline the next observation is diffed against.
///
/// Invariants:
/// - `transfers` always belongs to exactly one `gameweek`; the two are never
///   persisted independently.
/// - It holds *every* pair observed as of the last successful check of that
///   gameweek, not only the ones that were new at the time.
/// - Writers replace the whole document; there are no partial merges.
///
/// Both keys are required on the wire, even when `gameweek` is `null`. A
/// document missing either key (for example the legacy bare-array format)
/// fails to deserialize, which the store treats as absent state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    // deserialize_with opts out of serde's implicit None for missing Option
    // fields: the key must be present, null or not.
    #[serde(deserialize_with = "gameweek_key_required")]
    pub gameweek: Option<Gameweek>,
    pub transfers: Vec<TransferPair>,
}

fn gameweek_key_required<'de, D>(deserializer: D) -> Result<Option<Gameweek>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::deserialize(deserializer)
}

impl PersistedState {
    pub fn new(gameweek: Gameweek, transfers: Vec<TransferPair>) -> Self {
        Self {
            gameweek: Some(gameweek),
            transfers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty_first_run_state() {
        let state = PersistedState::default();
        assert_eq!(state.gameweek, None);
        assert!(state.transfers.is_empty());
    }

    #[test]
    fn test_wire_layout_matches_state_file_contract() {
        let state = PersistedState::new(
            Gameweek(5),
            vec![TransferPair::new("X", "Y")],
        );
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"gameweek": 5, "transfers": [["X", "Y"]]})
        );
    }

    #[test]
    fn test_bare_array_legacy_shape_does_not_deserialize() {
        let legacy = r#"[["X","Y"]]"#;
        assert!(serde_json::from_str::<PersistedState>(legacy).is_err());
    }

    #[test]
    fn test_missing_key_does_not_deserialize() {
        let missing_transfers = r#"{"gameweek": 5}"#;
        assert!(serde_json::from_str::<PersistedState>(missing_transfers).is_err());

        let missing_gameweek = r#"{"transfers": [["X","Y"]]}"#;
        assert!(serde_json::from_str::<PersistedState>(missing_gameweek).is_err());
    }

    #[test]
    fn test_null_gameweek_key_still_deserializes() {
        let first_run = r#"{"gameweek": null, "transfers": []}"#;
        let state: PersistedState = serde_json::from_str(first_run).unwrap();
        assert_eq!(state, PersistedState::default());
    }
}
