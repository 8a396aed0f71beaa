// Copyright (c) 2026 Hashchain Contributors. MIT License.
// See LICENSE for details.

//! # Hashchain Core Library
//!
//! An append-only, hash-chained ledger that lives entirely in memory. Each
//! block carries one transfer record and the hash of the block before it,
//! and no block gets in without first solving a proof-of-work puzzle.
//!
//! There is no networking, no consensus and no disk. One process, one
//! writer, one chain. What is left is the interesting part: deterministic
//! hashing, nonce search, and validation of the whole sequence.
//!
//! ## Architecture
//!
//! - **record**: The transfer payload (sender, receiver, amount).
//! - **block**: Record plus chain linkage, and the block hash.
//! - **hash**: SHA-256 helpers and leading-zero counting.
//! - **pow**: Proof-of-work nonce search.
//! - **chain**: The block sequence: append, validate, difficulty.
//! - **service**: Thread-safe facade that front ends talk to.
//! - **config**: Constants and runtime configuration.
//! - **error**: Service-level error type.
//!
//! ## Example
//!
//! ```
//! use hashchain::{Block, Chain, Record};
//!
//! let mut chain = Chain::new(1);
//! let tip_hash = chain.tip().hash_block();
//! let candidate = Block::new(Record::new("Alice", "Bob", 10.0), 42).with_prev_hash(tip_hash);
//!
//! chain.add_block(candidate)?;
//! assert_eq!(chain.len(), 2);
//! assert!(chain.is_valid());
//! # Ok::<(), hashchain::LedgerError>(())
//! ```

pub mod block;
pub mod chain;
pub mod config;
pub mod error;
pub mod hash;
pub mod pow;
pub mod record;
pub mod service;

pub use block::Block;
pub use chain::{Chain, Validation};
pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use pow::MiningReport;
pub use record::Record;
pub use service::{BlockRow, LedgerService, MinedBlock};
