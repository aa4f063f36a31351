/// Unified error type for all primitives operations.
///
/// Covers errors from byte decoding, string encodings, EC operations, and
/// network configuration.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("read of {length} bytes at offset {offset} exceeds buffer of {available} bytes")]
    BufferBounds {
        offset: usize,
        length: usize,
        available: usize,
    },

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid bech32: {0}")]
    InvalidBech32(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid network config: {0}")]
    InvalidConfig(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
