use std::fmt;

use camino_primitives::{Id, PrimitivesError, ShortId};

use crate::codec::Domain;

/// Error classes.
///
/// Format and invariant errors stop the current operation.  Balance and
/// key errors are returned so callers can retry with other parameters or
/// continue with a partial signature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed bytes, unknown type IDs, bad checksums.
    Format,
    /// Not enough funds, unsupported spend shape, numeric range.
    Balance,
    /// Missing keys or credential metadata.
    Key,
    /// Accounting drift inside the spend engine.
    Invariant,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Format => "format",
            ErrorKind::Balance => "balance",
            ErrorKind::Key => "key",
            ErrorKind::Invariant => "invariant",
        };
        f.write_str(name)
    }
}

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// A type ID outside the closed variant set of its domain.
    #[error("unknown {domain} type id {type_id}")]
    UnknownTypeId { domain: Domain, type_id: u32 },

    /// Bytes that cannot be decoded (overrun, bad counts, trailing data).
    #[error("malformed transaction at offset {offset}: {reason}")]
    Malformed { reason: String, offset: usize },

    /// An underlying primitives error (forwarded from `camino-primitives`).
    #[error("primitives error: {0}")]
    Primitives(PrimitivesError),

    /// The UTXO set cannot cover the requested amount plus burn.
    #[error("insufficient funds for asset {asset_id}: needed {needed}, available {available}")]
    InsufficientFunds {
        asset_id: Id,
        needed: u64,
        available: u64,
    },

    /// A single spend call was asked to move more than one asset.
    #[error("spend covers {0} assets; exactly one is supported per call")]
    MultiAssetSpend(usize),

    /// An amount overflowed or fell outside its allowed range.
    #[error("amount out of range: {0}")]
    AmountOutOfRange(String),

    /// A delegation fee outside [0, 100] percent.
    #[error("delegation fee out of range: {0}")]
    DelegationFeeRange(String),

    /// No key for an address that must sign.
    #[error("no key for address {address}")]
    KeyNotFound { address: ShortId },

    /// A signature index without a known signing address.
    #[error("signature index {index} has no resolved signer")]
    UnresolvedSigIdx { index: u32 },

    /// The credential type cannot hold the requested signature shape.
    #[error("credential type {type_id} cannot carry this signature")]
    CredentialId { type_id: u32 },

    /// Spend engine accounting did not balance.
    #[error("balance invariant violated: inputs {inputs} != outputs {outputs} + burned {burned}")]
    BalanceInvariant { inputs: u64, outputs: u64, burned: u64 },

    /// Owner set rejected (threshold or address list).
    #[error("invalid owners: {0}")]
    InvalidOwners(String),

    /// The chain has no output variant for the requested lock state.
    #[error("unsupported lock state: {0}")]
    UnsupportedLock(String),
}

/// Buffer overruns are malformed input; everything else is forwarded.
impl From<PrimitivesError> for TransactionError {
    fn from(e: PrimitivesError) -> Self {
        match e {
            PrimitivesError::BufferBounds { offset, .. } => {
                TransactionError::malformed(e.to_string(), offset)
            }
            other => TransactionError::Primitives(other),
        }
    }
}

impl TransactionError {
    /// Build a `Malformed` error.
    pub fn malformed(reason: impl Into<String>, offset: usize) -> Self {
        TransactionError::Malformed {
            reason: reason.into(),
            offset,
        }
    }

    /// The class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransactionError::UnknownTypeId { .. }
            | TransactionError::Malformed { .. }
            | TransactionError::Primitives(_)
            | TransactionError::InvalidOwners(_) => ErrorKind::Format,
            TransactionError::InsufficientFunds { .. }
            | TransactionError::MultiAssetSpend(_)
            | TransactionError::AmountOutOfRange(_)
            | TransactionError::DelegationFeeRange(_)
            | TransactionError::UnsupportedLock(_) => ErrorKind::Balance,
            TransactionError::KeyNotFound { .. }
            | TransactionError::UnresolvedSigIdx { .. }
            | TransactionError::CredentialId { .. } => ErrorKind::Key,
            TransactionError::BalanceInvariant { .. } => ErrorKind::Invariant,
        }
    }

    /// Whether a caller can reasonably retry or continue with partial results.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Balance)
            || matches!(self, TransactionError::KeyNotFound { .. })
    }
}
