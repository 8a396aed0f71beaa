//! # Block Structure
//!
//! A block wraps one [`Record`] with the metadata that ties it into the
//! chain.
//!
//! ## Block Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  record: Record      (sender, receiver, amt) │
//! │  creator_id: u64                             │
//! │  prev_hash: String   ("0" for genesis)       │
//! │  timestamp: String   (HH:MM:SS, UTC)         │
//! │  nonce: u64          (mutated by mining)     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Hash Computation
//!
//! `SHA-256(record || creator_id || timestamp || prev_hash || nonce)`, each
//! field written as text, rendered as lowercase hex. The hash is never
//! stored on the block; it is recomputed from the fields whenever it is
//! needed, so a tampered field always shows up in the next recomputation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{GENESIS_CREATOR_ID, GENESIS_PREV_HASH, TIMESTAMP_FORMAT};
use crate::hash::sha256_hex_multi;
use crate::record::Record;

/// One link in the ledger.
///
/// Only mining touches a block after construction, and only the nonce.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// The transfer this block carries.
    pub record: Record,
    /// Identifier of whoever built the block.
    pub creator_id: u64,
    /// Hex hash of the previous block, or `"0"` for genesis.
    pub prev_hash: String,
    /// UTC wall-clock time of construction, `HH:MM:SS`.
    pub timestamp: String,
    /// Proof-of-work counter.
    pub nonce: u64,
}

impl Block {
    /// Build a block with default linkage: genesis prev hash, current time,
    /// nonce zero. Override with the `with_*` methods.
    pub fn new(record: Record, creator_id: u64) -> Self {
        Self {
            record,
            creator_id,
            prev_hash: GENESIS_PREV_HASH.to_string(),
            timestamp: current_timestamp(),
            nonce: 0,
        }
    }

    /// The first block of every chain. Never mined.
    pub fn genesis() -> Self {
        Self::new(Record::genesis(), GENESIS_CREATOR_ID)
    }

    pub fn with_prev_hash(mut self, prev_hash: impl Into<String>) -> Self {
        self.prev_hash = prev_hash.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Recompute the block hash from the current field values.
    ///
    /// Field order is fixed: record, creator id, timestamp, prev hash, nonce.
    /// Changing the order or any field's text form changes every hash on
    /// every chain.
    pub fn hash_block(&self) -> String {
        let record = self.record.canonical();
        let creator_id = self.creator_id.to_string();
        let nonce = self.nonce.to_string();

        sha256_hex_multi(&[
            record.as_bytes(),
            creator_id.as_bytes(),
            self.timestamp.as_bytes(),
            self.prev_hash.as_bytes(),
            nonce.as_bytes(),
        ])
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block(record={}, creator_id={}, prev_hash={}, timestamp={}, nonce={})",
            self.record, self.creator_id, self.prev_hash, self.timestamp, self.nonce
        )
    }
}

/// Current UTC time formatted as a block timestamp.
pub fn current_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}
