use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::account::{AccountKey, Timestamp};
use crate::error::{LedgerError, LedgerResult};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenesisState {
    pub genesis_time: Timestamp,
    #[serde(default)]
    pub accounts: Vec<GenesisAccount>,
}

/// An account funded and registered at genesis.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenesisAccount {
    pub username: AccountKey,
    pub public_key: String,
    /// Whole-coin decimal string, e.g. "1000.5".
    pub coin: String,
}

impl GenesisState {
    pub fn from_json(s: &str) -> LedgerResult<Self> {
        serde_json::from_str(s).map_err(|e| LedgerError::InvalidConfig(format!("genesis: {}", e)))
    }

    pub fn load(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LedgerError::InvalidConfig(format!("Genesis file not found: {}", path.display())));
        }
        let content = fs::read_to_string(path).map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> LedgerResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_genesis() {
        let json = r#"{
            "genesis_time": 1500000000,
            "accounts": [
                { "username": "lino", "public_key": "00", "coin": "10000000000" }
            ]
        }"#;
        let genesis = GenesisState::from_json(json).unwrap();
        assert_eq!(genesis.genesis_time, 1_500_000_000);
        assert_eq!(genesis.accounts[0].username.as_str(), "lino");
        assert_eq!(GenesisState::from_json(&genesis.to_json().unwrap()).unwrap(), genesis);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GenesisState::load(dir.path().join("genesis.json")).is_err());
    }

    #[test]
    fn test_bad_username_rejected() {
        let json = r#"{ "genesis_time": 0, "accounts": [ { "username": "Li", "public_key": "00", "coin": "1" } ] }"#;
        assert!(GenesisState::from_json(json).is_err());
    }
}
