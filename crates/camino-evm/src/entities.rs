//! The UTXO-side entities the EVM chain imports and exports: plain SECP
//! transfers only.

use camino_primitives::ec::Signature;
use camino_primitives::util::{ByteReader, ByteWriter};
use camino_transaction::codec::{Codec, Domain, Encodable, Variant};
use camino_transaction::secp::{SecpCredential, SecpTransferInput, SecpTransferOutput};
use camino_transaction::{
    CredentialVariant, InputVariant, LockState, OutputOwners, OutputVariant, SigIdx, TransactionError,
};

use crate::type_ids;

fn unlocked_only(what: &str, lock: &LockState) -> Result<(), TransactionError> {
    match lock {
        LockState::Unlocked => Ok(()),
        other => Err(TransactionError::UnsupportedLock(format!(
            "evm chain {} cannot be {:?}",
            what, other
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    SecpTransfer(SecpTransferOutput),
}

impl Output {
    pub fn transfer(amount: u64, owners: OutputOwners) -> Self {
        Output::SecpTransfer(SecpTransferOutput::new(amount, owners))
    }
}

impl Variant for Output {
    const DOMAIN: Domain = Domain::Output;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        match type_id {
            type_ids::SECP_TRANSFER_OUTPUT => Ok(Output::SecpTransfer(SecpTransferOutput::default())),
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        type_ids::SECP_TRANSFER_OUTPUT
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        let Output::SecpTransfer(o) = self;
        o.write_to(writer, codec);
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        let Output::SecpTransfer(o) = self;
        *o = SecpTransferOutput::read_from(reader, codec)?;
        Ok(())
    }
}

impl OutputVariant for Output {
    fn amount(&self) -> u64 {
        let Output::SecpTransfer(o) = self;
        o.amount
    }

    fn owners(&self) -> &OutputOwners {
        let Output::SecpTransfer(o) = self;
        &o.owners
    }

    fn locked(amount: u64, owners: OutputOwners, lock: &LockState) -> Result<Self, TransactionError> {
        unlocked_only("outputs", lock)?;
        Ok(Output::transfer(amount, owners))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    SecpTransfer(SecpTransferInput),
}

impl Variant for Input {
    const DOMAIN: Domain = Domain::Input;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        match type_id {
            type_ids::SECP_TRANSFER_INPUT => Ok(Input::SecpTransfer(SecpTransferInput::default())),
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        type_ids::SECP_TRANSFER_INPUT
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
        unlocked_only("inputs", lock)?;
        Ok(Input::SecpTransfer(SecpTransferInput::new(amount, sig_indices)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Secp(SecpCredential),
}

impl Variant for Credential {
    const DOMAIN: Domain = Domain::Credential;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        match type_id {
            type_ids::SECP_CREDENTIAL => Ok(Credential::Secp(SecpCredential::default())),
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        type_ids::SECP_CREDENTIAL
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        let Credential::Secp(c) = self;
        c.write_to(writer, codec);
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        let Credential::Secp(c) = self;
        *c = SecpCredential::read_from(reader, codec)?;
        Ok(())
    }
}

impl CredentialVariant for Credential {
    fn signatures(&self) -> &[Signature] {
        let Credential::Secp(c) = self;
        &c.signatures
    }

    fn signatures_mut(&mut self) -> &mut Vec<Signature> {
        let Credential::Secp(c) = self;
        &mut c.signatures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_primitives::ShortId;

    #[test]
    fn test_locked_values_rejected() {
        let owners = OutputOwners::single(ShortId::new([1; 20]));
        let lock = LockState::StakeableLocked { locktime: 5 };
        assert!(matches!(
            Output::locked(1, owners.clone(), &lock),
            Err(TransactionError::UnsupportedLock(_))
        ));
        assert!(Input::spending(1, vec![], &lock).is_err());
        assert_eq!(Output::locked(1, owners, &LockState::Unlocked).unwrap().amount(), 1);
    }

    #[test]
    fn test_output_vector() {
        let out = Output::transfer(1, OutputOwners::single(ShortId::new([0x11; 20])));
        let bytes = out.to_typed_bytes(Codec::V0);
        assert_eq!(&bytes[..4], &[0, 0, 0, 7]);
        assert_eq!(Output::from_typed_bytes(&bytes, Codec::V0).unwrap(), out);
        assert!(matches!(
            Credential::select(8204, Codec::V0),
            Err(TransactionError::UnknownTypeId { domain: Domain::Credential, type_id: 8204 })
        ));
    }
}
