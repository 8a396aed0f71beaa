//! Error types for the ledger service.
//!
//! Validation and hashing never fail. Mining can run out of nonces, and the
//! service adds bad configuration, rejected difficulty changes, and a
//! mining worker that died before returning its block.

use thiserror::Error;

/// Errors returned by mining, [`LedgerService`](crate::service::LedgerService)
/// and [`LedgerConfig`](crate::config::LedgerConfig).
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Requested difficulty is outside the configured bounds.
    #[error("difficulty {requested} outside allowed range [{min}, {max}]")]
    DifficultyOutOfRange {
        /// The difficulty that was asked for.
        requested: usize,
        /// Configured lower bound.
        min: usize,
        /// Configured upper bound.
        max: usize,
    },

    /// Every nonce from `start` up to `u64::MAX` was tried without meeting
    /// the target.
    #[error("nonce space exhausted from {start} at difficulty {difficulty}")]
    NonceExhausted {
        /// Nonce the search started from.
        start: u64,
        /// Difficulty the search was run against.
        difficulty: usize,
    },

    /// The blocking mining task panicked or was cancelled.
    #[error("mining task failed: {0}")]
    MiningTask(String),

    /// Configuration could not be parsed or is internally inconsistent.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
