//! Ledger configuration

use serde::{Deserialize, Serialize};

use crate::constants::RETENTION_WINDOW;
use crate::error::{LedgerError, Result};

/// Tunables for a `BlockChain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Blocks of history retained below the max height.
    pub retention_window: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            retention_window: RETENTION_WINDOW,
        }
    }
}

impl LedgerConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Zero would retain nothing but the tip's own height.
        if self.retention_window == 0 {
            return Err(LedgerError::InvalidConfig(
                "retention_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
