//! # Ledger Configuration & Constants
//!
//! Every magic number in the ledger lives here. Changing any of the
//! serialization constants changes every block hash, so treat them as
//! frozen once a chain exists.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

// ---------------------------------------------------------------------------
// Chain Linkage
// ---------------------------------------------------------------------------

/// Previous-hash value carried by the genesis block.
pub const GENESIS_PREV_HASH: &str = "0";

/// Creator id stamped on the genesis block.
pub const GENESIS_CREATOR_ID: u64 = 0;

/// Sender and receiver written into the genesis record.
pub const GENESIS_PARTY: &str = "Genesis";

/// Creator id the service stamps on blocks it builds for callers.
pub const DEFAULT_CREATOR_ID: u64 = 42;

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// `chrono` format string for block timestamps (UTC wall clock).
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Fractional digits used when an amount is written into the hash preimage.
/// Fixed so the same amount always yields the same bytes.
pub const AMOUNT_DECIMALS: usize = 8;

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Proof-of-Work
// ---------------------------------------------------------------------------

/// Leading zero hex digits required when nothing else is configured.
pub const DEFAULT_DIFFICULTY: usize = 2;

/// Lowest difficulty the service accepts by default.
pub const DEFAULT_MIN_DIFFICULTY: usize = 1;

/// Highest difficulty the service accepts by default. Each extra digit is
/// roughly 16x more work, and 5 already takes about a million hashes.
pub const DEFAULT_MAX_DIFFICULTY: usize = 5;

// ---------------------------------------------------------------------------
// Network Parameters
// ---------------------------------------------------------------------------

/// Default HTTP API port for the node.
pub const DEFAULT_API_PORT: u16 = 8501;

/// Default Prometheus metrics port for the node.
pub const DEFAULT_METRICS_PORT: u16 = 9102;

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Runtime settings for a [`LedgerService`](crate::service::LedgerService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Difficulty the chain starts with.
    pub difficulty: usize,
    /// Lower bound accepted by `set_difficulty`.
    pub min_difficulty: usize,
    /// Upper bound accepted by `set_difficulty`.
    pub max_difficulty: usize,
    /// Creator id stamped on blocks built by the service.
    pub creator_id: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            min_difficulty: DEFAULT_MIN_DIFFICULTY,
            max_difficulty: DEFAULT_MAX_DIFFICULTY,
            creator_id: DEFAULT_CREATOR_ID,
        }
    }
}

impl LedgerConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> LedgerResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the difficulty bounds are coherent.
    ///
    /// A digest has only [`HASH_HEX_LENGTH`] hex digits, so anything above
    /// that can never be mined.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.min_difficulty > self.max_difficulty {
            return Err(LedgerError::InvalidConfig(format!(
                "min_difficulty {} exceeds max_difficulty {}",
                self.min_difficulty, self.max_difficulty
            )));
        }
        if self.max_difficulty > HASH_HEX_LENGTH {
            return Err(LedgerError::InvalidConfig(format!(
                "max_difficulty {} exceeds digest length {}",
                self.max_difficulty, HASH_HEX_LENGTH
            )));
        }
        if !(self.min_difficulty..=self.max_difficulty).contains(&self.difficulty) {
            return Err(LedgerError::InvalidConfig(format!(
                "difficulty {} outside [{}, {}]",
                self.difficulty, self.min_difficulty, self.max_difficulty
            )));
        }
        Ok(())
    }
}
