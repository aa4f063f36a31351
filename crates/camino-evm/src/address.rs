//! 20-byte EVM account addresses.

use std::fmt;
use std::str::FromStr;

use camino_primitives::ec::PublicKey;
use camino_primitives::{PrimitivesError, ShortId};
use sha3::{Digest, Keccak256};

/// Length of an EVM address in bytes.
pub const ETH_ADDRESS_LEN: usize = 20;

/// An EVM account: the last 20 bytes of keccak-256 over the uncompressed
/// public key without its `0x04` tag.
///
/// Rendered as `0x`-prefixed lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EthAddress([u8; ETH_ADDRESS_LEN]);

impl EthAddress {
    pub const fn new(bytes: [u8; ETH_ADDRESS_LEN]) -> Self {
        EthAddress(bytes)
    }

    pub fn from_public_key(key: &PublicKey) -> Self {
        let digest = Keccak256::digest(&key.to_uncompressed()[1..]);
        let mut out = [0u8; ETH_ADDRESS_LEN];
        out.copy_from_slice(&digest[12..]);
        EthAddress(out)
    }

    /// Parse hex, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, PrimitivesError> {
        let body = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(body)?;
        if bytes.len() != ETH_ADDRESS_LEN {
            return Err(PrimitivesError::InvalidLength {
                expected: ETH_ADDRESS_LEN,
                got: bytes.len(),
            });
        }
        let mut out = [0u8; ETH_ADDRESS_LEN];
        out.copy_from_slice(&bytes);
        Ok(EthAddress(out))
    }

    pub fn as_bytes(&self) -> &[u8; ETH_ADDRESS_LEN] {
        &self.0
    }

    /// The same 20 bytes as a signer slot.  Key sources that know EVM
    /// accounts map it back to the signing key.
    pub fn to_short_id(&self) -> ShortId {
        ShortId::new(self.0)
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthAddress({})", self)
    }
}

impl FromStr for EthAddress {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EthAddress::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_primitives::ec::PrivateKey;

    #[test]
    fn test_address_of_key_one() {
        let mut raw = [0u8; 32];
        raw[31] = 1;
        let key = PrivateKey::from_bytes(&raw).unwrap();
        let address = EthAddress::from_public_key(&key.pub_key());
        assert_eq!(address.to_string(), "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
    }

    #[test]
    fn test_parse() {
        let address: EthAddress = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf".parse().unwrap();
        assert_eq!(address.as_bytes()[0], 0x7e);
        assert_eq!(EthAddress::from_hex("7e5f4552091a69125d5dfcb7b8c2659029395bdf").unwrap(), address);
        assert!(matches!(
            EthAddress::from_hex("0x7e5f"),
            Err(PrimitivesError::InvalidLength { expected: 20, got: 2 })
        ));
        assert!(EthAddress::from_hex("0xzz").is_err());
    }
}
