//! # Ledger Service
//!
//! The surface a front end talks to: build records and blocks, append,
//! validate, list, and tune difficulty. Wraps a [`Chain`] so it can be
//! shared across tasks.
//!
//! ## Concurrency
//!
//! ```text
//! submit ──► writer gate (owned tokio Mutex guard)
//!              │
//!              ├─ read tip hash + difficulty     (RwLock read)
//!              ├─ spawn_blocking(pow::mine)      (gate moves into the task)
//!              └─ push mined block               (RwLock write, gate back)
//! ```
//!
//! Mining runs on the blocking pool so it never stalls the async runtime.
//! The writer gate serializes submissions end to end: a second submission
//! cannot read the tip until the first one has appended, so blocks are
//! never linked to a stale tip or appended out of order. Readers only take
//! the `RwLock` briefly and are never blocked by an in-flight search.
//!
//! The gate guard travels into the blocking task and comes back with its
//! result. If the caller's future is dropped mid-search (an HTTP client
//! disconnecting, say) the search still runs to completion and its block
//! is discarded, but the gate stays closed until it finishes, so the next
//! submission never mines alongside an orphaned search.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

use crate::block::Block;
use crate::chain::{Chain, Validation};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::pow::{self, MiningReport};
use crate::record::Record;

/// A block that has just been mined and appended.
#[derive(Debug, Clone)]
pub struct MinedBlock {
    /// Position in the chain.
    pub index: usize,
    /// The appended block.
    pub block: Block,
    /// Search statistics.
    pub report: MiningReport,
}

/// One table row: every block field as display text, plus the block hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRow {
    pub index: usize,
    pub sender: String,
    pub receiver: String,
    pub amount: String,
    pub creator_id: String,
    pub prev_hash: String,
    pub timestamp: String,
    pub nonce: String,
    pub hash: String,
}

impl BlockRow {
    pub fn from_block(index: usize, block: &Block) -> Self {
        Self {
            index,
            sender: block.record.sender.clone(),
            receiver: block.record.receiver.clone(),
            amount: block.record.amount.to_string(),
            creator_id: block.creator_id.to_string(),
            prev_hash: block.prev_hash.clone(),
            timestamp: block.timestamp.clone(),
            nonce: block.nonce.to_string(),
            hash: block.hash_block(),
        }
    }
}

/// Shared, thread-safe handle over a single chain.
pub struct LedgerService {
    chain: Arc<RwLock<Chain>>,
    writer: Arc<Mutex<()>>,
    config: LedgerConfig,
}

impl LedgerService {
    /// Start a new chain (genesis only) using `config`.
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        let chain = Chain::new(config.difficulty);
        Ok(Self::from_parts(chain, config))
    }

    /// Wrap an existing chain. The chain's own difficulty is kept, but it
    /// must lie within the configured bounds.
    pub fn from_chain(chain: Chain, config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        let difficulty = chain.difficulty();
        if !(config.min_difficulty..=config.max_difficulty).contains(&difficulty) {
            return Err(LedgerError::InvalidConfig(format!(
                "chain difficulty {} outside allowed range [{}, {}]",
                difficulty, config.min_difficulty, config.max_difficulty
            )));
        }
        Ok(Self::from_parts(chain, config))
    }

    fn from_parts(chain: Chain, config: LedgerConfig) -> Self {
        Self {
            chain: Arc::new(RwLock::new(chain)),
            writer: Arc::new(Mutex::new(())),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // -- Construction ---------------------------------------------------------

    pub fn create_record(sender: impl Into<String>, receiver: impl Into<String>, amount: f64) -> Record {
        Record::new(sender, receiver, amount)
    }

    /// Build a candidate linked to the current tip, stamped with the
    /// configured creator id.
    pub fn create_block(&self, record: Record) -> Block {
        Block::new(record, self.config.creator_id).with_prev_hash(self.tip_hash())
    }

    // -- Append ---------------------------------------------------------------

    /// Mine `candidate` against the current difficulty and append it.
    ///
    /// The candidate's linkage is trusted as given. Use [`submit`](Self::submit)
    /// to have the service link it to the tip under the same lock.
    pub async fn append_block(&self, candidate: Block) -> LedgerResult<MinedBlock> {
        let gate = Arc::clone(&self.writer).lock_owned().await;
        self.mine_and_push(gate, candidate).await
    }

    /// Record a transfer: build the record and a tip-linked block, mine it,
    /// append it.
    pub async fn submit(
        &self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: f64,
    ) -> LedgerResult<MinedBlock> {
        let gate = Arc::clone(&self.writer).lock_owned().await;
        let candidate = self.create_block(Self::create_record(sender, receiver, amount));
        self.mine_and_push(gate, candidate).await
    }

    async fn mine_and_push(
        &self,
        gate: OwnedMutexGuard<()>,
        candidate: Block,
    ) -> LedgerResult<MinedBlock> {
        let difficulty = self.chain.read().difficulty();

        let (mined, _gate) =
            tokio::task::spawn_blocking(move || (pow::mine(candidate, difficulty), gate))
                .await
                .map_err(|e| LedgerError::MiningTask(e.to_string()))?;
        let (block, report) = mined?;

        let index = {
            let mut chain = self.chain.write();
            chain.push_mined(block.clone());
            chain.len() - 1
        };

        info!(index, attempts = report.attempts, hash = %report.hash, "block added");
        Ok(MinedBlock { index, block, report })
    }

    // -- Queries --------------------------------------------------------------

    pub fn validate_chain(&self) -> Validation {
        self.chain.read().validate()
    }

    /// Snapshot of every block, genesis first.
    pub fn get_blocks(&self) -> Vec<Block> {
        self.chain.read().blocks().to_vec()
    }

    pub fn get_block(&self, index: usize) -> Option<Block> {
        self.chain.read().get(index).cloned()
    }

    /// The chain rendered as display rows.
    pub fn table(&self) -> Vec<BlockRow> {
        let chain = self.chain.read();
        chain
            .blocks()
            .iter()
            .enumerate()
            .map(|(i, b)| BlockRow::from_block(i, b))
            .collect()
    }

    pub fn tip_hash(&self) -> String {
        self.chain.read().tip().hash_block()
    }

    pub fn height(&self) -> usize {
        self.chain.read().len()
    }

    pub fn difficulty(&self) -> usize {
        self.chain.read().difficulty()
    }

    // -- Difficulty -----------------------------------------------------------

    /// Set the difficulty for future mining.
    ///
    /// A search already in progress keeps the difficulty it started with.
    pub fn set_difficulty(&self, difficulty: usize) -> LedgerResult<()> {
        let (min, max) = (self.config.min_difficulty, self.config.max_difficulty);
        if !(min..=max).contains(&difficulty) {
            return Err(LedgerError::DifficultyOutOfRange {
                requested: difficulty,
                min,
                max,
            });
        }
        self.chain.write().set_difficulty(difficulty);
        Ok(())
    }
}
