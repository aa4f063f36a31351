//! Asset chain inputs and credentials.

use camino_primitives::ec::Signature;
use camino_primitives::util::{ByteReader, ByteWriter};
use camino_transaction::codec::{Codec, Domain, Encodable, Variant};
use camino_transaction::secp::{SecpCredential, SecpTransferInput};
use camino_transaction::{CredentialVariant, InputVariant, LockState, SigIdx, TransactionError};

use crate::type_ids;

/// Every input the asset chain knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    SecpTransfer(SecpTransferInput),
}

impl Variant for Input {
    const DOMAIN: Domain = Domain::Input;

    fn select(type_id: u32, codec: Codec) -> Result<Self, TransactionError> {
        match (type_id, type_ids::extended(codec)) {
            (type_ids::SECP_TRANSFER_INPUT, false) | (type_ids::V1_SECP_TRANSFER_INPUT, true) => {
                Ok(Input::SecpTransfer(SecpTransferInput::default()))
            }
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, codec: Codec) -> u32 {
        match self {
            Input::SecpTransfer(_) if type_ids::extended(codec) => type_ids::V1_SECP_TRANSFER_INPUT,
            Input::SecpTransfer(_) => type_ids::SECP_TRANSFER_INPUT,
        }
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        let Input::SecpTransfer(i) = self;
        i.write_to(writer, codec);
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        let Input::SecpTransfer(i) = self;
        *i = SecpTransferInput::read_from(reader, codec)?;
        Ok(())
    }
}

impl InputVariant for Input {
    type Credential = Credential;

    fn amount(&self) -> u64 {
        let Input::SecpTransfer(i) = self;
        i.amount
    }

    fn sig_indices(&self) -> &[SigIdx] {
        let Input::SecpTransfer(i) = self;
        &i.sig_indices
    }

    fn sig_indices_mut(&mut self) -> &mut Vec<SigIdx> {
        let Input::SecpTransfer(i) = self;
        &mut i.sig_indices
    }

    fn credential(&self) -> Credential {
        Credential::Secp(SecpCredential::default())
    }

    fn spending(amount: u64, sig_indices: Vec<SigIdx>, lock: &LockState) -> Result<Self, TransactionError> {
        match lock {
            LockState::Unlocked => Ok(Input::SecpTransfer(SecpTransferInput::new(amount, sig_indices))),
            other => Err(TransactionError::UnsupportedLock(format!(
                "asset chain inputs cannot spend {:?}",
                other
            ))),
        }
    }
}

/// Every credential the asset chain knows.  Both carry plain signatures;
/// they differ only in which extension verifies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Secp(SecpCredential),
    Nft(SecpCredential),
}

impl Variant for Credential {
    const DOMAIN: Domain = Domain::Credential;

    fn select(type_id: u32, codec: Codec) -> Result<Self, TransactionError> {
        match (type_id, type_ids::extended(codec)) {
            (type_ids::SECP_CREDENTIAL, false) | (type_ids::V1_SECP_CREDENTIAL, true) => {
                Ok(Credential::Secp(SecpCredential::default()))
            }
            (type_ids::NFT_CREDENTIAL, false) | (type_ids::V1_NFT_CREDENTIAL, true) => {
                Ok(Credential::Nft(SecpCredential::default()))
            }
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, codec: Codec) -> u32 {
        let v1 = type_ids::extended(codec);
        match self {
            Credential::Secp(_) if v1 => type_ids::V1_SECP_CREDENTIAL,
            Credential::Secp(_) => type_ids::SECP_CREDENTIAL,
            Credential::Nft(_) if v1 => type_ids::V1_NFT_CREDENTIAL,
            Credential::Nft(_) => type_ids::NFT_CREDENTIAL,
        }
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        match self {
            Credential::Secp(c) | Credential::Nft(c) => c.write_to(writer, codec),
        }
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        match self {
            Credential::Secp(c) | Credential::Nft(c) => *c = SecpCredential::read_from(reader, codec)?,
        }
        Ok(())
    }
}

impl CredentialVariant for Credential {
    fn signatures(&self) -> &[Signature] {
        match self {
            Credential::Secp(c) | Credential::Nft(c) => &c.signatures,
        }
    }

    fn signatures_mut(&mut self) -> &mut Vec<Signature> {
        match self {
            Credential::Secp(c) | Credential::Nft(c) => &mut c.signatures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_primitives::ShortId;

    #[test]
    fn test_input_vector() {
        let input = Input::SecpTransfer(SecpTransferInput::new(
            1000,
            vec![SigIdx::with_source(0, ShortId::new([1; 20]))],
        ));
        let bytes = input.to_typed_bytes(Codec::V0);
        assert_eq!(hex::encode(&bytes), "0000000500000000000003e80000000100000000");
        assert_eq!(&input.to_typed_bytes(Codec::V1)[..4], &65536u32.to_be_bytes());
    }

    #[test]
    fn test_credential_ids() {
        let nft = Credential::Nft(SecpCredential::default());
        assert_eq!(nft.type_id(Codec::V0), 14);
        assert_eq!(nft.type_id(Codec::V1), 131076);
        let bytes = nft.to_typed_bytes(Codec::V1);
        assert_eq!(Credential::from_typed_bytes(&bytes, Codec::V1).unwrap(), nft);
        assert!(matches!(
            Credential::select(5, Codec::V0),
            Err(TransactionError::UnknownTypeId { domain: Domain::Credential, type_id: 5 })
        ));
    }

    #[test]
    fn test_no_multisig_shape() {
        let cred = Input::SecpTransfer(SecpTransferInput::default()).credential();
        assert!(cred.to_multisig().is_none());
    }
}
