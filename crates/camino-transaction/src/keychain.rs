//! Key pairs and the keychain used as the default signing key source.

use std::collections::HashMap;

use camino_primitives::ec::{PrivateKey, PublicKey, Signature};
use camino_primitives::ShortId;

use crate::TransactionError;

/// A private key with its cached address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    private_key: PrivateKey,
    address: ShortId,
}

impl KeyPair {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self::from_private_key(PrivateKey::new())
    }

    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let address = private_key.address();
        KeyPair {
            private_key,
            address,
        }
    }

    /// Import from raw 32-byte key material.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        Ok(Self::from_private_key(PrivateKey::from_bytes(bytes)?))
    }

    /// Import from `PrivateKey-<cb58>` or bare CB58.
    pub fn from_string(s: &str) -> Result<Self, TransactionError> {
        Ok(Self::from_private_key(PrivateKey::from_cb58(s.trim())?))
    }

    pub fn address(&self) -> ShortId {
        self.address
    }

    pub fn public_key(&self) -> PublicKey {
        self.private_key.pub_key()
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Render as `PrivateKey-<cb58>`.
    pub fn private_key_string(&self) -> String {
        self.private_key.to_cb58()
    }

    /// Sign a 32-byte digest.
    pub fn sign(&self, digest: &[u8]) -> Result<Signature, TransactionError> {
        Ok(self.private_key.sign(digest)?)
    }

    /// Recover the signer's public key from a signature over `digest`.
    pub fn recover(digest: &[u8], signature: &Signature) -> Result<PublicKey, TransactionError> {
        Ok(signature.recover_public_key(digest)?)
    }

    /// Whether `signature` over `digest` was made by this key.
    pub fn verify(&self, digest: &[u8], signature: &Signature) -> bool {
        self.public_key().verify(digest, signature)
    }
}

/// Keys indexed by address.  Insertion order is irrelevant.
#[derive(Debug, Clone, Default)]
pub struct KeyChain {
    keys: HashMap<ShortId, KeyPair>,
}

impl KeyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a key, store it and return its address.
    pub fn make_key(&mut self) -> ShortId {
        self.add(KeyPair::generate())
    }

    /// Store a key pair, replacing any with the same address.
    pub fn add(&mut self, key: KeyPair) -> ShortId {
        let address = key.address();
        self.keys.insert(address, key);
        address
    }

    /// Import a `PrivateKey-<cb58>` or bare CB58 string.
    pub fn import_key(&mut self, s: &str) -> Result<ShortId, TransactionError> {
        Ok(self.add(KeyPair::from_string(s)?))
    }

    /// Import raw 32-byte key material.
    pub fn import_key_bytes(&mut self, bytes: &[u8]) -> Result<ShortId, TransactionError> {
        Ok(self.add(KeyPair::from_bytes(bytes)?))
    }

    pub fn get(&self, address: &ShortId) -> Option<&KeyPair> {
        self.keys.get(address)
    }

    pub fn has(&self, address: &ShortId) -> bool {
        self.keys.contains_key(address)
    }

    pub fn remove(&mut self, address: &ShortId) -> Option<KeyPair> {
        self.keys.remove(address)
    }

    /// Stored addresses, ascending.
    pub fn addresses(&self) -> Vec<ShortId> {
        let mut addresses: Vec<ShortId> = self.keys.keys().copied().collect();
        addresses.sort();
        addresses
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sign `digest` with the key for `address`.
    pub fn sign_with(&self, address: &ShortId, digest: &[u8]) -> Result<Signature, TransactionError> {
        self.get(address)
            .ok_or(TransactionError::KeyNotFound { address: *address })?
            .sign(digest)
    }
}
