//! Interfaces to the network collaborator.
//!
//! The transport (JSON-RPC over HTTP) lives outside this crate.  These
//! traits are the shape the core needs from it: UTXOs in, signed bytes out.

use std::fmt;
use std::str::FromStr;

use camino_primitives::{Id, ShortId};

use crate::entity::OutputVariant;
use crate::utxo_set::UtxoSet;
use crate::TransactionError;

/// Acceptance status of an issued transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxStatus {
    Unknown,
    Processing,
    Committed,
    Accepted,
    Rejected,
    Dropped,
}

impl TxStatus {
    /// Whether the status can no longer change.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            TxStatus::Committed | TxStatus::Accepted | TxStatus::Rejected | TxStatus::Dropped
        )
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxStatus::Unknown => "Unknown",
            TxStatus::Processing => "Processing",
            TxStatus::Committed => "Committed",
            TxStatus::Accepted => "Accepted",
            TxStatus::Rejected => "Rejected",
            TxStatus::Dropped => "Dropped",
        };
        f.write_str(name)
    }
}

impl FromStr for TxStatus {
    type Err = TransactionError;

    /// Parse the status names nodes report.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unknown" => Ok(TxStatus::Unknown),
            "Processing" => Ok(TxStatus::Processing),
            "Committed" => Ok(TxStatus::Committed),
            "Accepted" => Ok(TxStatus::Accepted),
            "Rejected" => Ok(TxStatus::Rejected),
            "Dropped" => Ok(TxStatus::Dropped),
            other => Err(TransactionError::malformed(
                format!("unknown transaction status {:?}", other),
                0,
            )),
        }
    }
}

/// Source of UTXOs for a set of addresses.
pub trait UtxoProvider<O: OutputVariant> {
    type Error: std::error::Error + From<TransactionError>;

    /// Every UTXO owned (in whole or in part) by any of `addresses`.
    fn get_utxos(&self, addresses: &[ShortId]) -> Result<UtxoSet<O>, Self::Error>;
}

/// Accepts signed transactions.
pub trait TxIssuer {
    type Error: std::error::Error;

    /// Submit signed transaction bytes; returns the transaction ID.
    fn issue_tx(&self, signed_tx: &[u8]) -> Result<Id, Self::Error>;

    fn tx_status(&self, tx_id: &Id) -> Result<TxStatus, Self::Error>;
}
