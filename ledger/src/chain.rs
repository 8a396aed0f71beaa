//! # Chain
//!
//! The ordered block sequence plus the difficulty new blocks are mined
//! against. Index 0 is genesis, the last element is the tip.
//!
//! Linkage (`blocks[i].prev_hash == hash(blocks[i - 1])`) is not enforced
//! on append. [`Chain::add_block`] trusts the caller to link the candidate
//! to the current tip, and [`Chain::validate`] checks the whole sequence
//! on demand. A chain can therefore sit in a broken state until the next
//! validation pass notices.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::block::Block;
use crate::config::DEFAULT_DIFFICULTY;
use crate::error::LedgerResult;
use crate::pow::{self, MiningReport};

/// Outcome of a full-chain validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Validation {
    /// Every block links to the hash of its predecessor.
    Valid,
    /// The block at `index` does not link to its predecessor. Blocks after
    /// it were not examined.
    Invalid { index: usize },
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    /// Index of the first broken link, if any.
    pub fn first_invalid_index(&self) -> Option<usize> {
        match self {
            Validation::Valid => None,
            Validation::Invalid { index } => Some(*index),
        }
    }
}

/// Append-only sequence of blocks.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
    difficulty: usize,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl Chain {
    /// A fresh chain holding only a genesis block stamped with the current time.
    pub fn new(difficulty: usize) -> Self {
        Self::with_genesis(Block::genesis(), difficulty)
    }

    /// A chain seeded with a caller-supplied genesis block.
    pub fn with_genesis(genesis: Block, difficulty: usize) -> Self {
        info!(difficulty, genesis_hash = %genesis.hash_block(), "initializing chain");
        Self {
            blocks: vec![genesis],
            difficulty,
        }
    }

    // -- Proof-of-work --------------------------------------------------------

    /// Mine `candidate` against the current difficulty.
    ///
    /// Returns the same block with its nonce set to the smallest value (at
    /// or above its starting nonce) whose hash has `difficulty` leading zero
    /// hex digits. Blocks the calling thread until a solution is found, or
    /// fails with `NonceExhausted` if the search would pass `u64::MAX`.
    pub fn proof_of_work(&self, candidate: Block) -> LedgerResult<Block> {
        let (block, _) = pow::mine(candidate, self.difficulty)?;
        Ok(block)
    }

    /// Like [`proof_of_work`](Self::proof_of_work) but also returns the
    /// search report.
    pub fn mine(&self, candidate: Block) -> LedgerResult<(Block, MiningReport)> {
        pow::mine(candidate, self.difficulty)
    }

    // -- Append ---------------------------------------------------------------

    /// Mine `candidate` and append it as the new tip.
    ///
    /// The candidate's `prev_hash` is not checked; pass one linked to the
    /// current tip or the next validation will fail. Nothing is appended
    /// if mining fails.
    pub fn add_block(&mut self, candidate: Block) -> LedgerResult<&Block> {
        let block = self.proof_of_work(candidate)?;
        Ok(self.push_mined(block))
    }

    /// Append a block that has already been mined elsewhere.
    ///
    /// Neither the proof-of-work nor the linkage is rechecked.
    pub fn push_mined(&mut self, block: Block) -> &Block {
        self.blocks.push(block);
        let index = self.blocks.len() - 1;
        debug!(index, "block appended");
        &self.blocks[index]
    }

    // -- Validation -----------------------------------------------------------

    /// Walk the chain and report the first broken link, if any.
    pub fn validate(&self) -> Validation {
        let mut expected = self.blocks[0].hash_block();

        for (index, block) in self.blocks.iter().enumerate().skip(1) {
            if block.prev_hash != expected {
                warn!(
                    index,
                    expected = %expected,
                    found = %block.prev_hash,
                    "blockchain is invalid"
                );
                return Validation::Invalid { index };
            }
            expected = block.hash_block();
        }

        info!(height = self.blocks.len(), "blockchain is valid");
        Validation::Valid
    }

    /// `true` if every block links to the hash of its predecessor.
    pub fn is_valid(&self) -> bool {
        self.validate().is_valid()
    }

    // -- Accessors ------------------------------------------------------------

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable view of the stored blocks.
    ///
    /// A slice, so blocks can be edited in place but not inserted or
    /// removed. Edits are not checked until the next [`validate`](Self::validate).
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// The most recently appended block. Genesis on a fresh chain.
    pub fn tip(&self) -> &Block {
        // The constructor always seeds genesis and nothing removes blocks.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`: a chain holds at least its genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Change the difficulty for future mining. Existing blocks are not
    /// re-examined.
    pub fn set_difficulty(&mut self, difficulty: usize) {
        info!(old = self.difficulty, new = difficulty, "difficulty changed");
        self.difficulty = difficulty;
    }
}
