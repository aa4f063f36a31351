//! Fixed-size identifiers.
//!
//! Provides `Id` (32 bytes: transaction, asset, chain, subnet IDs),
//! `ShortId` (20 bytes: addresses) and `NodeId` (20 bytes, rendered with a
//! `NodeID-` prefix).  All three display as CB58 and serialize to JSON as
//! strings.  Ordering is plain byte order, which is also the canonical
//! sort order on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cb58;
use crate::hash::sha256;
use crate::PrimitivesError;

/// Size of an `Id` in bytes.
pub const ID_LEN: usize = 32;

/// Size of a `ShortId` / `NodeId` in bytes.
pub const SHORT_ID_LEN: usize = 20;

/// String prefix of a rendered node ID.
pub const NODE_ID_PREFIX: &str = "NodeID-";

fn copy_exact<const N: usize>(bytes: &[u8]) -> Result<[u8; N], PrimitivesError> {
    if bytes.len() != N {
        return Err(PrimitivesError::InvalidLength {
            expected: N,
            got: bytes.len(),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(bytes);
    Ok(arr)
}

// ---------------------------------------------------------------------------
// Id
// ---------------------------------------------------------------------------

/// A 32-byte identifier for transactions, assets, blockchains and subnets.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Id([u8; ID_LEN]);

impl Id {
    /// The all-zero ID.
    pub const ZERO: Id = Id([0u8; ID_LEN]);

    /// Create an ID from a raw 32-byte array.
    pub const fn new(bytes: [u8; ID_LEN]) -> Self {
        Id(bytes)
    }

    /// Create an ID from a byte slice that must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        Ok(Id(copy_exact(bytes)?))
    }

    /// The ID whose bytes are SHA-256 of `data` (how transaction IDs are formed).
    pub fn from_sha256(data: &[u8]) -> Self {
        Id(sha256(data))
    }

    /// Parse a CB58 string.
    pub fn from_cb58(s: &str) -> Result<Self, PrimitivesError> {
        Self::from_slice(&cb58::check_decode(s)?)
    }

    /// Parse a hex string (with or without a `0x` prefix).
    pub fn from_hex(s: &str) -> Result<Self, PrimitivesError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Self::from_slice(&hex::decode(s)?)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Whether every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ID_LEN]
    }

    /// Derive a new ID by appending a big-endian index and hashing.
    ///
    /// Used to name outputs synthesized locally before their transaction is
    /// confirmed.
    pub fn prefixed(&self, index: u32) -> Id {
        let mut data = Vec::with_capacity(4 + ID_LEN);
        data.extend_from_slice(&index.to_be_bytes());
        data.extend_from_slice(&self.0);
        Id(sha256(&data))
    }
}

impl From<[u8; ID_LEN]> for Id {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Id(bytes)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", cb58::check_encode(&self.0))
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self)
    }
}

impl FromStr for Id {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Id::from_cb58(s)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Id::from_cb58(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// ShortId
// ---------------------------------------------------------------------------

/// A 20-byte identifier, used for addresses.
///
/// An address is hash160 of a compressed secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ShortId([u8; SHORT_ID_LEN]);

impl ShortId {
    /// The all-zero short ID.
    pub const ZERO: ShortId = ShortId([0u8; SHORT_ID_LEN]);

    /// Create a short ID from a raw 20-byte array.
    pub const fn new(bytes: [u8; SHORT_ID_LEN]) -> Self {
        ShortId(bytes)
    }

    /// Create a short ID from a byte slice that must be exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        Ok(ShortId(copy_exact(bytes)?))
    }

    /// Parse a CB58 string.
    pub fn from_cb58(s: &str) -> Result<Self, PrimitivesError> {
        Self::from_slice(&cb58::check_decode(s)?)
    }

    /// Parse a hex string (with or without a `0x` prefix).
    pub fn from_hex(s: &str) -> Result<Self, PrimitivesError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Self::from_slice(&hex::decode(s)?)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SHORT_ID_LEN] {
        &self.0
    }
}

impl From<[u8; SHORT_ID_LEN]> for ShortId {
    fn from(bytes: [u8; SHORT_ID_LEN]) -> Self {
        ShortId(bytes)
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", cb58::check_encode(&self.0))
    }
}

impl fmt::Debug for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShortId({})", self)
    }
}

impl FromStr for ShortId {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShortId::from_cb58(s)
    }
}

impl Serialize for ShortId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ShortId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ShortId::from_cb58(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// A 20-byte validator node identity, rendered as `NodeID-<cb58>`.
///
/// Node identities are secp256k1-derived, so `NodeId::from(address)`
/// names the node whose key hashes to that address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId([u8; SHORT_ID_LEN]);

impl NodeId {
    /// Create a node ID from a raw 20-byte array.
    pub const fn new(bytes: [u8; SHORT_ID_LEN]) -> Self {
        NodeId(bytes)
    }

    /// Create a node ID from a byte slice that must be exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        Ok(NodeId(copy_exact(bytes)?))
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SHORT_ID_LEN] {
        &self.0
    }

    /// The address whose key controls this node identity.
    pub fn to_short_id(&self) -> ShortId {
        ShortId(self.0)
    }
}

impl From<ShortId> for NodeId {
    fn from(id: ShortId) -> Self {
        NodeId(id.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NODE_ID_PREFIX, cb58::check_encode(&self.0))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Parse `NodeID-<cb58>`; the prefix is optional.
impl FromStr for NodeId {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix(NODE_ID_PREFIX).unwrap_or(s);
        NodeId::from_slice(&cb58::check_decode(body)?)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_id_display() {
        assert_eq!(Id::ZERO.to_string(), "11111111111111111111111111111111LpoYY");
        assert!(Id::ZERO.is_zero());
    }

    #[test]
    fn test_id_cb58_roundtrip() {
        let id = Id::new([7u8; 32]);
        let parsed: Id = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_wrong_length() {
        assert!(matches!(
            Id::from_slice(&[1u8; 31]),
            Err(PrimitivesError::InvalidLength { expected: 32, got: 31 })
        ));
    }

    #[test]
    fn test_id_from_hex_with_prefix() {
        let hex_str = format!("0x{}", "ab".repeat(32));
        assert_eq!(Id::from_hex(&hex_str).unwrap(), Id::new([0xab; 32]));
    }

    #[test]
    fn test_ordering_is_byte_order() {
        let mut a = [0u8; 20];
        let mut b = [0u8; 20];
        a[0] = 1;
        b[19] = 0xff;
        assert!(ShortId::new(b) < ShortId::new(a));
    }

    #[test]
    fn test_node_id_prefix() {
        let node = NodeId::new([3u8; 20]);
        let rendered = node.to_string();
        assert!(rendered.starts_with("NodeID-"));
        assert_eq!(rendered.parse::<NodeId>().unwrap(), node);
        // Prefix-less form is accepted too.
        let bare = rendered.trim_start_matches(NODE_ID_PREFIX);
        assert_eq!(bare.parse::<NodeId>().unwrap(), node);
    }

    #[test]
    fn test_serde_json_as_string() {
        let id = Id::new([1u8; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_prefixed_is_deterministic_and_index_sensitive() {
        let id = Id::new([9u8; 32]);
        assert_eq!(id.prefixed(1), id.prefixed(1));
        assert_ne!(id.prefixed(1), id.prefixed(2));
    }
}
