//! Transfer records: the payload each block carries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{AMOUNT_DECIMALS, GENESIS_PARTY};

/// A single transfer: who sent how much to whom.
///
/// No validation is performed. Empty names and zero or negative amounts
/// are accepted as-is; input coercion belongs to whatever front end
/// collects the values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Sending party.
    pub sender: String,
    /// Receiving party.
    pub receiver: String,
    /// Amount transferred.
    pub amount: f64,
}

impl Record {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: f64) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }

    /// The placeholder record carried by the genesis block.
    pub fn genesis() -> Self {
        Self::new(GENESIS_PARTY, GENESIS_PARTY, 0.0)
    }

    /// Canonical string form fed into the block hash.
    ///
    /// ```text
    /// Record(sender="Alice", receiver="Bob", amount=10.00000000)
    /// ```
    ///
    /// Names are debug-escaped so embedded quotes or separators cannot make
    /// two different records serialize identically. The amount always has
    /// [`AMOUNT_DECIMALS`] fractional digits.
    pub fn canonical(&self) -> String {
        format!(
            "Record(sender={:?}, receiver={:?}, amount={:.prec$})",
            self.sender,
            self.receiver,
            self.amount,
            prec = AMOUNT_DECIMALS
        )
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}
