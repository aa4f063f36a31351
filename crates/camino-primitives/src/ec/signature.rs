//! Recoverable ECDSA signatures.
//!
//! Credentials carry signatures in a fixed 65-byte layout:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0      | 32   | r (big-endian) |
//! | 32     | 32   | s (big-endian, low-S) |
//! | 64     | 1    | recovery id (0..=3) |
//!
//! Signing uses RFC6979 deterministic nonces, so the same key and digest
//! always produce the same 65 bytes.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{self, RecoveryId, VerifyingKey};

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// Length of an encoded signature.
pub const SIGNATURE_LEN: usize = 65;

/// Length of the digest every signature covers.
pub const DIGEST_LEN: usize = 32;

/// A 65-byte recoverable secp256k1 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    /// Wrap raw signature bytes without validating the scalars.
    ///
    /// Decoding a credential never validates signatures; use
    /// [`Signature::recover_public_key`] or [`Signature::verify`] for that.
    pub const fn new(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Signature(bytes)
    }

    /// Wrap a 65-byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(PrimitivesError::InvalidLength {
                expected: SIGNATURE_LEN,
                got: bytes.len(),
            });
        }
        let mut arr = [0u8; SIGNATURE_LEN];
        arr.copy_from_slice(bytes);
        Ok(Signature(arr))
    }

    /// The raw 65 bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// The trailing recovery byte.
    pub fn recovery_id(&self) -> u8 {
        self.0[64]
    }

    /// Sign a 32-byte digest.
    pub fn sign(digest: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        check_digest(digest)?;
        // k256 already returns the low-S form with a matching recovery id.
        let (sig, recovery_id) = priv_key
            .signing_key()
            .sign_prehash_recoverable(digest)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;

        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = recovery_id.to_byte();
        Ok(Signature(out))
    }

    /// Recover the public key that produced this signature over `digest`.
    pub fn recover_public_key(&self, digest: &[u8]) -> Result<PublicKey, PrimitivesError> {
        check_digest(digest)?;
        let recovery_id = RecoveryId::from_byte(self.0[64]).ok_or_else(|| {
            PrimitivesError::InvalidSignature(format!("invalid recovery id {}", self.0[64]))
        })?;
        let sig = self.k256_signature()?;
        let vk = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(PublicKey::from_k256_verifying_key(&vk))
    }

    /// Verify against a digest and a known public key.
    pub fn verify(&self, digest: &[u8], pub_key: &PublicKey) -> bool {
        if digest.len() != DIGEST_LEN {
            return false;
        }
        match self.k256_signature() {
            Ok(sig) => pub_key.verifying_key().verify_prehash(digest, &sig).is_ok(),
            Err(_) => false,
        }
    }

    fn k256_signature(&self) -> Result<ecdsa::Signature, PrimitivesError> {
        ecdsa::Signature::from_slice(&self.0[..64])
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

fn check_digest(digest: &[u8]) -> Result<(), PrimitivesError> {
    if digest.len() != DIGEST_LEN {
        return Err(PrimitivesError::InvalidLength {
            expected: DIGEST_LEN,
            got: digest.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    #[test]
    fn test_sign_is_deterministic() {
        let key = PrivateKey::from_bytes(&[0x11; 32]).unwrap();
        let digest = sha256(b"camino");
        let a = key.sign(&digest).unwrap();
        let b = key.sign(&digest).unwrap();
        assert_eq!(a, b);
        assert!(a.recovery_id() <= 3);
    }

    #[test]
    fn test_recover_matches_signer() {
        let key = PrivateKey::new();
        let digest = sha256(b"recover me");
        let sig = key.sign(&digest).unwrap();
        let recovered = sig.recover_public_key(&digest).unwrap();
        assert_eq!(recovered.address(), key.address());
        assert!(key.pub_key().verify(&digest, &sig));
    }

    #[test]
    fn test_low_s() {
        // Half the curve order; s must not exceed it.
        let half =
            hex::decode("7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0")
                .unwrap();
        for i in 0..16u8 {
            let key = PrivateKey::from_bytes(&[i + 1; 32]).unwrap();
            let sig = key.sign(&sha256(&[i])).unwrap();
            assert!(sig.as_bytes()[32..64] <= half[..]);
        }
    }

    #[test]
    fn test_wrong_digest_fails_verification() {
        let key = PrivateKey::new();
        let sig = key.sign(&sha256(b"one")).unwrap();
        assert!(!key.pub_key().verify(&sha256(b"two"), &sig));
        assert!(!key.pub_key().verify(b"short", &sig));
    }

    #[test]
    fn test_bad_recovery_byte() {
        let key = PrivateKey::new();
        let digest = sha256(b"x");
        let mut bytes = *key.sign(&digest).unwrap().as_bytes();
        bytes[64] = 9;
        assert!(Signature::new(bytes).recover_public_key(&digest).is_err());
    }

    #[test]
    fn test_from_bytes_length() {
        assert!(Signature::from_bytes(&[0u8; 64]).is_err());
        assert!(Signature::from_bytes(&[0u8; 65]).is_ok());
    }
}
