use serde::Deserialize;

use crate::constants::DEFAULT_DIFFICULTY;
use crate::pow::Miner;

/// Ledger settings. Every field is optional in TOML.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Leading zero hex digits required of newly mined blocks.
    pub difficulty: usize,
    /// Give up mining a block after this many hashes.
    pub max_attempts: Option<u64>,
    pub parallel_mining: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            max_attempts: None,
            parallel_mining: false,
        }
    }
}

impl LedgerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn miner(&self) -> Miner {
        Miner::new(self.max_attempts, self.parallel_mining)
    }
}
