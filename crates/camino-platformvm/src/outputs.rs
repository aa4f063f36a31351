//! Platform chain outputs.
//!
//! Locked variants wrap a typed SECP transfer output: a stakeable lock
//! adds a locktime before it, a deposit/bond lock adds the two locking
//! transaction IDs.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::Id;
use camino_transaction::codec::{Codec, Domain, Encodable, ReadExt, Variant};
use camino_transaction::secp::SecpTransferOutput;
use camino_transaction::{LockState, LockedIds, OutputOwners, OutputVariant, TransactionError};

use crate::type_ids;

/// Write `type ID | owners` for a reward, subnet or alias owner field.
pub fn write_owner(writer: &mut ByteWriter, owners: &OutputOwners, codec: Codec) {
    writer.write_u32_be(type_ids::SECP_OWNER_OUTPUT);
    owners.write_to(writer, codec);
}

/// Read an owner field written by [`write_owner`].
pub fn read_owner(reader: &mut ByteReader<'_>, codec: Codec) -> Result<OutputOwners, TransactionError> {
    let type_id = reader.read_u32_be().reading("owner type id")?;
    if type_id != type_ids::SECP_OWNER_OUTPUT {
        return Err(TransactionError::UnknownTypeId {
            domain: Domain::Output,
            type_id,
        });
    }
    OutputOwners::read_from(reader, codec)
}

fn write_inner(writer: &mut ByteWriter, output: &SecpTransferOutput, codec: Codec) {
    writer.write_u32_be(type_ids::SECP_TRANSFER_OUTPUT);
    output.write_to(writer, codec);
}

fn read_inner(reader: &mut ByteReader<'_>, codec: Codec) -> Result<SecpTransferOutput, TransactionError> {
    let type_id = reader.read_u32_be().reading("locked output type id")?;
    if type_id != type_ids::SECP_TRANSFER_OUTPUT {
        return Err(TransactionError::UnknownTypeId {
            domain: Domain::Output,
            type_id,
        });
    }
    SecpTransferOutput::read_from(reader, codec)
}

/// Value usable only for staking until `locktime`.
///
/// Body: `locktime u64 | type ID | transfer output`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StakeableLockOut {
    pub locktime: u64,
    pub output: SecpTransferOutput,
}

impl Encodable for StakeableLockOut {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_u64_be(self.locktime);
        write_inner(writer, &self.output, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let locktime = reader.read_u64_be().reading("stakeable locktime")?;
        let output = read_inner(reader, codec)?;
        Ok(StakeableLockOut { locktime, output })
    }
}

/// Value held by a deposit and/or bond.
///
/// Body: `deposit tx ID 32 | bond tx ID 32 | type ID | transfer output`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockedOut {
    pub ids: LockedIds,
    pub output: SecpTransferOutput,
}

pub(crate) fn write_locked_ids(writer: &mut ByteWriter, ids: &LockedIds) {
    writer.write_bytes(ids.deposit_tx_id.as_bytes());
    writer.write_bytes(ids.bond_tx_id.as_bytes());
}

pub(crate) fn read_locked_ids(reader: &mut ByteReader<'_>) -> Result<LockedIds, TransactionError> {
    let deposit = Id::new(reader.read_array().reading("deposit tx id")?);
    let bond = Id::new(reader.read_array().reading("bond tx id")?);
    Ok(LockedIds::new(deposit, bond))
}

impl Encodable for LockedOut {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        write_locked_ids(writer, &self.ids);
        write_inner(writer, &self.output, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let ids = read_locked_ids(reader)?;
        let output = read_inner(reader, codec)?;
        Ok(LockedOut { ids, output })
    }
}

/// Every output the platform chain knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    SecpTransfer(SecpTransferOutput),
    StakeableLock(StakeableLockOut),
    Locked(LockedOut),
}

impl Output {
    pub fn transfer(amount: u64, owners: OutputOwners) -> Self {
        Output::SecpTransfer(SecpTransferOutput::new(amount, owners))
    }

    /// The transfer output inside any lock wrapper.
    pub fn inner(&self) -> &SecpTransferOutput {
        match self {
            Output::SecpTransfer(o) => o,
            Output::StakeableLock(o) => &o.output,
            Output::Locked(o) => &o.output,
        }
    }
}

impl Variant for Output {
    const DOMAIN: Domain = Domain::Output;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        match type_id {
            type_ids::SECP_TRANSFER_OUTPUT => Ok(Output::SecpTransfer(SecpTransferOutput::default())),
            type_ids::STAKEABLE_LOCK_OUT => Ok(Output::StakeableLock(StakeableLockOut::default())),
            type_ids::LOCKED_OUT => Ok(Output::Locked(LockedOut::default())),
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        match self {
            Output::SecpTransfer(_) => type_ids::SECP_TRANSFER_OUTPUT,
            Output::StakeableLock(_) => type_ids::STAKEABLE_LOCK_OUT,
            Output::Locked(_) => type_ids::LOCKED_OUT,
        }
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        match self {
            Output::SecpTransfer(o) => o.write_to(writer, codec),
            Output::StakeableLock(o) => o.write_to(writer, codec),
            Output::Locked(o) => o.write_to(writer, codec),
        }
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        match self {
            Output::SecpTransfer(o) => *o = SecpTransferOutput::read_from(reader, codec)?,
            Output::StakeableLock(o) => *o = StakeableLockOut::read_from(reader, codec)?,
            Output::Locked(o) => *o = LockedOut::read_from(reader, codec)?,
        }
        Ok(())
    }
}

impl OutputVariant for Output {
    fn amount(&self) -> u64 {
        self.inner().amount
    }

    fn owners(&self) -> &OutputOwners {
        &self.inner().owners
    }

    fn lock_state(&self) -> LockState {
        match self {
            Output::SecpTransfer(_) => LockState::Unlocked,
            Output::StakeableLock(o) => LockState::StakeableLocked { locktime: o.locktime },
            Output::Locked(o) => LockState::Locked(o.ids),
        }
    }

    fn locked(amount: u64, owners: OutputOwners, lock: &LockState) -> Result<Self, TransactionError> {
        let output = SecpTransferOutput::new(amount, owners);
        Ok(match *lock {
            LockState::Unlocked => Output::SecpTransfer(output),
            LockState::StakeableLocked { locktime } => Output::StakeableLock(StakeableLockOut { locktime, output }),
            LockState::Locked(ids) if ids.is_locked() => Output::Locked(LockedOut { ids, output }),
            LockState::Locked(_) => Output::SecpTransfer(output),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_primitives::ShortId;
    use camino_transaction::lock::THIS_TX_ID;

    fn owners() -> OutputOwners {
        OutputOwners::single(ShortId::new([0x11; 20]))
    }

    #[test]
    fn test_stakeable_lock_out_layout() {
        let out = Output::locked(1_000, owners(), &LockState::StakeableLocked { locktime: 77 }).unwrap();
        let bytes = out.to_typed_bytes(Codec::V0);
        assert_eq!(&bytes[..4], &22u32.to_be_bytes());
        assert_eq!(&bytes[4..12], &77u64.to_be_bytes());
        assert_eq!(&bytes[12..16], &7u32.to_be_bytes());
        assert_eq!(Output::from_typed_bytes(&bytes, Codec::V0).unwrap(), out);
        assert_eq!(out.lock_state().effective(77), LockState::Unlocked);
        assert_eq!(out.lock_state().effective(76), LockState::StakeableLocked { locktime: 77 });
    }

    #[test]
    fn test_locked_out_layout() {
        let ids = LockedIds::new(THIS_TX_ID, Id::ZERO);
        let out = Output::locked(5, owners(), &LockState::Locked(ids)).unwrap();
        let bytes = out.to_typed_bytes(Codec::V1);
        assert_eq!(&bytes[..4], &8193u32.to_be_bytes());
        assert_eq!(&bytes[4..36], THIS_TX_ID.as_bytes());
        assert_eq!(&bytes[36..68], Id::ZERO.as_bytes());
        assert_eq!(Output::from_typed_bytes(&bytes, Codec::V1).unwrap(), out);
        assert_eq!(out.amount(), 5);
    }

    #[test]
    fn test_empty_lock_ids_produce_plain_output() {
        let out = Output::locked(5, owners(), &LockState::Locked(LockedIds::default())).unwrap();
        assert!(matches!(out, Output::SecpTransfer(_)));
    }

    #[test]
    fn test_wrapped_inner_must_be_transfer() {
        let mut bytes = Output::locked(1, owners(), &LockState::StakeableLocked { locktime: 1 })
            .unwrap()
            .to_typed_bytes(Codec::V0);
        bytes[15] = 11;
        assert!(matches!(
            Output::from_typed_bytes(&bytes, Codec::V0),
            Err(TransactionError::UnknownTypeId { domain: Domain::Output, type_id: 11 })
        ));
    }

    #[test]
    fn test_owner_field() {
        let mut w = ByteWriter::new();
        write_owner(&mut w, &owners(), Codec::V0);
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..4], &11u32.to_be_bytes());
        let mut r = ByteReader::new(&bytes);
        assert_eq!(read_owner(&mut r, Codec::V0).unwrap(), owners());
    }
}
