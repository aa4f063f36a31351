//! secp256k1 private key.
//!
//! Wraps the k256 signing key and adds the `PrivateKey-<cb58>` string form
//! used by wallets and node tooling.

use std::fmt;
use std::str::FromStr;

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::cb58;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::ids::ShortId;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
pub const PRIVATE_KEY_LEN: usize = 32;

/// String prefix of an encoded private key.
pub const PRIVATE_KEY_PREFIX: &str = "PrivateKey-";

/// A secp256k1 private key.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key using the OS random number generator.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from a raw 32-byte scalar.
    ///
    /// Fails if the length is wrong or the scalar is zero or not below the
    /// curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_LEN,
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner: signing_key })
    }

    /// Create a private key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let mut bytes = hex::decode(hex_str.strip_prefix("0x").unwrap_or(hex_str))?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Parse a CB58 private key, with or without the `PrivateKey-` prefix.
    pub fn from_cb58(s: &str) -> Result<Self, PrimitivesError> {
        let body = s.strip_prefix(PRIVATE_KEY_PREFIX).unwrap_or(s);
        let mut bytes = cb58::check_decode(body)?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Encode as `PrivateKey-<cb58>`.
    pub fn to_cb58(&self) -> String {
        let mut bytes = self.to_bytes();
        let encoded = format!("{}{}", PRIVATE_KEY_PREFIX, cb58::check_encode(&bytes));
        bytes.zeroize();
        encoded
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LEN] {
        let mut out = [0u8; PRIVATE_KEY_LEN];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Derive the corresponding public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// The 20-byte address controlled by this key.
    pub fn address(&self) -> ShortId {
        self.pub_key().address()
    }

    /// Sign a 32-byte digest, producing a 65-byte recoverable signature.
    pub fn sign(&self, digest: &[u8]) -> Result<Signature, PrimitivesError> {
        Signature::sign(digest, self)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

/// Never prints key material.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({})", self.address())
    }
}

impl FromStr for PrivateKey {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrivateKey::from_cb58(s)
    }
}
