//! # Proof-of-Work
//!
//! Brute-force nonce search. Starting from the candidate's current nonce,
//! hash, check the leading zero digits, bump the nonce, repeat. The first
//! nonce that satisfies the target wins, so the result is always the
//! smallest qualifying nonce at or above the starting value.
//!
//! There is no iteration cap and no cancellation. The nonce never wraps:
//! if the search reaches `u64::MAX` without a hit it stops with
//! [`LedgerError::NonceExhausted`] rather than restarting from zero. With a
//! difficulty the digest cannot satisfy (more than 64 digits) a search from
//! a low nonce will not end in practice; callers that accept difficulty
//! from outside bound it first.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::block::Block;
use crate::error::{LedgerError, LedgerResult};
use crate::hash::meets_difficulty;

/// What a mining run produced, alongside the mined block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningReport {
    /// Winning hash.
    pub hash: String,
    /// Winning nonce.
    pub nonce: u64,
    /// Hashes computed, including the winning one.
    pub attempts: u64,
    /// Difficulty the block was mined against.
    pub difficulty: usize,
    /// Wall-clock time spent searching.
    pub elapsed: Duration,
}

/// Mine `block` against `difficulty`, returning the mined block and a
/// report of the search.
///
/// Takes the candidate by value: the nonce is rewritten in place and the
/// same block comes back out. Fails only when no nonce between the
/// starting one and `u64::MAX` meets the target.
pub fn mine(mut block: Block, difficulty: usize) -> LedgerResult<(Block, MiningReport)> {
    let start = Instant::now();
    let start_nonce = block.nonce;
    let mut attempts: u64 = 1;
    let mut hash = block.hash_block();

    while !meets_difficulty(&hash, difficulty) {
        block.nonce = match block.nonce.checked_add(1) {
            Some(next) => next,
            None => {
                warn!(start_nonce, attempts, difficulty, "nonce space exhausted");
                return Err(LedgerError::NonceExhausted {
                    start: start_nonce,
                    difficulty,
                });
            }
        };
        hash = block.hash_block();
        attempts = attempts.saturating_add(1);
    }

    let elapsed = start.elapsed();
    info!(hash = %hash, nonce = block.nonce, difficulty, "winning hash");
    debug!(attempts, elapsed_ms = elapsed.as_millis() as u64, "mining finished");

    let report = MiningReport {
        hash,
        nonce: block.nonce,
        attempts,
        difficulty,
        elapsed,
    };
    Ok((block, report))
}
