use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::account::types::Coin;
use crate::error::{LedgerError, LedgerResult};

pub const DEFAULT_VESTING_WINDOW_SECS: i64 = 7 * 24 * 3600;
pub const DEFAULT_CAPACITY_RECOVER_PERIOD_SECS: i64 = 7 * 24 * 3600;
pub const DEFAULT_DECIMAL_SCALE: u64 = 100_000;

/// Economic parameters of the chain. Every validator must run with the
/// same values.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub vesting_window_secs: i64,
    pub capacity_recover_period_secs: i64,
    pub decimal_scale: u64,
    #[serde(default = "default_register_fee")]
    pub register_fee: Coin,
}

fn default_register_fee() -> Coin {
    Coin::new(DEFAULT_DECIMAL_SCALE)
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            vesting_window_secs: DEFAULT_VESTING_WINDOW_SECS,
            capacity_recover_period_secs: DEFAULT_CAPACITY_RECOVER_PERIOD_SECS,
            decimal_scale: DEFAULT_DECIMAL_SCALE,
            register_fee: default_register_fee(),
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> LedgerResult<()> {
        if self.vesting_window_secs <= 0 {
            return Err(LedgerError::InvalidConfig("vesting_window_secs must be positive".to_string()));
        }
        if self.capacity_recover_period_secs <= 0 {
            return Err(LedgerError::InvalidConfig(
                "capacity_recover_period_secs must be positive".to_string(),
            ));
        }
        if self.decimal_scale == 0 {
            return Err(LedgerError::InvalidConfig("decimal_scale must be positive".to_string()));
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> LedgerResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&s)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.exists() {
            match Self::load(path) {
                Ok(c) => {
                    info!("Config loaded from {}", path.display());
                    c
                }
                Err(e) => {
                    warn!("Error loading config: {}. Using defaults.", e);
                    Self::default()
                }
            }
        } else {
            info!("Config file not found at '{}'. Creating default.", path.display());
            let config = Self::default();
            match toml::to_string_pretty(&config) {
                Ok(s) => {
                    if let Err(e) = std::fs::write(path, s) {
                        warn!("Could not write default config: {}", e);
                    }
                }
                Err(e) => warn!("Could not render default config: {}", e),
            }
            config
        }
    }
}
