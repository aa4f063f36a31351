/// Camino SDK - Byte codec, hashing, encodings, identifiers, and keys.
///
/// This crate provides the foundational building blocks for the SDK:
/// - Big-endian cursor reader/writer used by every wire layout
/// - Hash functions (SHA-256, RIPEMD-160, hash160)
/// - CB58 (base58 with a SHA-256 checksum) encoding
/// - 32-byte IDs, 20-byte short IDs and node IDs
/// - Bech32 chain-address formatting
/// - secp256k1 private/public keys and recoverable signatures
/// - Network configuration presets

pub mod util;
pub mod hash;
pub mod cb58;
pub mod ids;
pub mod address;
pub mod ec;
pub mod network;

mod error;
pub use error::PrimitivesError;
pub use ids::{Id, NodeId, ShortId};
