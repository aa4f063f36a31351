//! Platform chain inputs and credentials.

use camino_primitives::ec::Signature;
use camino_primitives::util::{ByteReader, ByteWriter};
use camino_transaction::codec::{Codec, Domain, Encodable, ReadExt, Variant};
use camino_transaction::secp::{MultisigCredential, SecpCredential, SecpTransferInput};
use camino_transaction::{CredentialVariant, InputVariant, LockState, LockedIds, SigIdx, TransactionError};

use crate::outputs::{read_locked_ids, write_locked_ids};
use crate::type_ids;

fn write_inner(writer: &mut ByteWriter, input: &SecpTransferInput, codec: Codec) {
    writer.write_u32_be(type_ids::SECP_TRANSFER_INPUT);
    input.write_to(writer, codec);
}

fn read_inner(reader: &mut ByteReader<'_>, codec: Codec) -> Result<SecpTransferInput, TransactionError> {
    let type_id = reader.read_u32_be().reading("locked input type id")?;
    if type_id != type_ids::SECP_TRANSFER_INPUT {
        return Err(TransactionError::UnknownTypeId {
            domain: Domain::Input,
            type_id,
        });
    }
    SecpTransferInput::read_from(reader, codec)
}

/// Spends a [`StakeableLockOut`](crate::outputs::StakeableLockOut).
///
/// Body: `locktime u64 | type ID | transfer input`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StakeableLockIn {
    pub locktime: u64,
    pub input: SecpTransferInput,
}

impl Encodable for StakeableLockIn {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_u64_be(self.locktime);
        write_inner(writer, &self.input, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let locktime = reader.read_u64_be().reading("stakeable locktime")?;
        let input = read_inner(reader, codec)?;
        Ok(StakeableLockIn { locktime, input })
    }
}

/// Spends a [`LockedOut`](crate::outputs::LockedOut).
///
/// Body: `deposit tx ID 32 | bond tx ID 32 | type ID | transfer input`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockedIn {
    pub ids: LockedIds,
    pub input: SecpTransferInput,
}

impl Encodable for LockedIn {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        write_locked_ids(writer, &self.ids);
        write_inner(writer, &self.input, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let ids = read_locked_ids(reader)?;
        let input = read_inner(reader, codec)?;
        Ok(LockedIn { ids, input })
    }
}

/// Every input the platform chain knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    SecpTransfer(SecpTransferInput),
    StakeableLock(StakeableLockIn),
    Locked(LockedIn),
}

impl Input {
    pub fn inner(&self) -> &SecpTransferInput {
        match self {
            Input::SecpTransfer(i) => i,
            Input::StakeableLock(i) => &i.input,
            Input::Locked(i) => &i.input,
        }
    }

    fn inner_mut(&mut self) -> &mut SecpTransferInput {
        match self {
            Input::SecpTransfer(i) => i,
            Input::StakeableLock(i) => &mut i.input,
            Input::Locked(i) => &mut i.input,
        }
    }

    /// Lock state of the output this input spends.
    pub fn lock_state(&self) -> LockState {
        match self {
            Input::SecpTransfer(_) => LockState::Unlocked,
            Input::StakeableLock(i) => LockState::StakeableLocked { locktime: i.locktime },
            Input::Locked(i) => LockState::Locked(i.ids),
        }
    }
}

impl Variant for Input {
    const DOMAIN: Domain = Domain::Input;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        match type_id {
            type_ids::SECP_TRANSFER_INPUT => Ok(Input::SecpTransfer(SecpTransferInput::default())),
            type_ids::STAKEABLE_LOCK_IN => Ok(Input::StakeableLock(StakeableLockIn::default())),
            type_ids::LOCKED_IN => Ok(Input::Locked(LockedIn::default())),
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        match self {
            Input::SecpTransfer(_) => type_ids::SECP_TRANSFER_INPUT,
            Input::StakeableLock(_) => type_ids::STAKEABLE_LOCK_IN,
            Input::Locked(_) => type_ids::LOCKED_IN,
        }
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        match self {
            Input::SecpTransfer(i) => i.write_to(writer, codec),
            Input::StakeableLock(i) => i.write_to(writer, codec),
            Input::Locked(i) => i.write_to(writer, codec),
        }
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        match self {
            Input::SecpTransfer(i) => *i = SecpTransferInput::read_from(reader, codec)?,
            Input::StakeableLock(i) => *i = StakeableLockIn::read_from(reader, codec)?,
            Input::Locked(i) => *i = LockedIn::read_from(reader, codec)?,
        }
        Ok(())
    }
}

impl InputVariant for Input {
    type Credential = Credential;

    fn amount(&self) -> u64 {
        self.inner().amount
    }

    fn sig_indices(&self) -> &[SigIdx] {
        &self.inner().sig_indices
    }

    fn sig_indices_mut(&mut self) -> &mut Vec<SigIdx> {
        &mut self.inner_mut().sig_indices
    }

    fn credential(&self) -> Credential {
        Credential::Secp(SecpCredential::default())
    }

    fn spending(amount: u64, sig_indices: Vec<SigIdx>, lock: &LockState) -> Result<Self, TransactionError> {
        let input = SecpTransferInput::new(amount, sig_indices);
        Ok(match *lock {
            LockState::Unlocked => Input::SecpTransfer(input),
            LockState::StakeableLocked { locktime } => Input::StakeableLock(StakeableLockIn { locktime, input }),
            LockState::Locked(ids) if ids.is_locked() => Input::Locked(LockedIn { ids, input }),
            LockState::Locked(_) => Input::SecpTransfer(input),
        })
    }
}

/// Every credential the platform chain knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Secp(SecpCredential),
    Multisig(MultisigCredential),
}

impl Variant for Credential {
    const DOMAIN: Domain = Domain::Credential;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        match type_id {
            type_ids::SECP_CREDENTIAL => Ok(Credential::Secp(SecpCredential::default())),
            type_ids::MULTISIG_CREDENTIAL => Ok(Credential::Multisig(MultisigCredential::default())),
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        match self {
            Credential::Secp(_) => type_ids::SECP_CREDENTIAL,
            Credential::Multisig(_) => type_ids::MULTISIG_CREDENTIAL,
        }
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        match self {
            Credential::Secp(c) => c.write_to(writer, codec),
            Credential::Multisig(c) => c.write_to(writer, codec),
        }
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        match self {
            Credential::Secp(c) => *c = SecpCredential::read_from(reader, codec)?,
            Credential::Multisig(c) => *c = MultisigCredential::read_from(reader, codec)?,
        }
        Ok(())
    }
}

impl CredentialVariant for Credential {
    fn signatures(&self) -> &[Signature] {
        match self {
            Credential::Secp(c) => &c.signatures,
            Credential::Multisig(c) => &c.signatures,
        }
    }

    fn signatures_mut(&mut self) -> &mut Vec<Signature> {
        match self {
            Credential::Secp(c) => &mut c.signatures,
            Credential::Multisig(c) => &mut c.signatures,
        }
    }

    fn to_multisig(&self) -> Option<Self> {
        Some(Credential::Multisig(MultisigCredential::default()))
    }

    fn as_multisig_mut(&mut self) -> Option<&mut MultisigCredential> {
        match self {
            Credential::Multisig(c) => Some(c),
            Credential::Secp(_) => None,
        }
    }
}
