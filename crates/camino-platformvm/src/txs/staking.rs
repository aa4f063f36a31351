//! Validator and delegator transactions.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::{Id, NodeId, ShortId};
use camino_transaction::codec::{read_list, write_list, Codec, Encodable, ReadExt};
use camino_transaction::transferable::{sort_outputs, TRANSFERABLE_OUTPUT_MIN_SIZE};
use camino_transaction::{OutputOwners, SubnetAuth, TransactionError, TransferableOutput};

use super::{BaseTx, PlatformTx};
use crate::auth::{read_auth, write_auth};
use crate::delegation_fee::DelegationFee;
use crate::outputs::{read_owner, write_owner, Output};

/// A node's validation period and stake weight.
///
/// Body: `node ID 20 | start u64 | end u64 | weight u64`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validator {
    pub node_id: NodeId,
    pub start_time: u64,
    pub end_time: u64,
    pub weight: u64,
}

impl Validator {
    pub fn new(node_id: NodeId, start_time: u64, end_time: u64, weight: u64) -> Result<Self, TransactionError> {
        if end_time <= start_time {
            return Err(TransactionError::AmountOutOfRange(format!(
                "validation ends at {} before it starts at {}",
                end_time, start_time
            )));
        }
        Ok(Validator {
            node_id,
            start_time,
            end_time,
            weight,
        })
    }
}

impl Encodable for Validator {
    fn write_to(&self, writer: &mut ByteWriter, _codec: Codec) {
        writer.write_bytes(self.node_id.as_bytes());
        writer.write_u64_be(self.start_time);
        writer.write_u64_be(self.end_time);
        writer.write_u64_be(self.weight);
    }

    fn read_from(reader: &mut ByteReader<'_>, _codec: Codec) -> Result<Self, TransactionError> {
        Ok(Validator {
            node_id: NodeId::new(reader.read_array().reading("node id")?),
            start_time: reader.read_u64_be().reading("start time")?,
            end_time: reader.read_u64_be().reading("end time")?,
            weight: reader.read_u64_be().reading("weight")?,
        })
    }
}

/// A validator of a specific subnet.
///
/// Body: `validator | subnet ID 32`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubnetValidator {
    pub validator: Validator,
    pub subnet_id: Id,
}

impl Encodable for SubnetValidator {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.validator.write_to(writer, codec);
        writer.write_bytes(self.subnet_id.as_bytes());
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(SubnetValidator {
            validator: Validator::read_from(reader, codec)?,
            subnet_id: Id::new(reader.read_array().reading("subnet id")?),
        })
    }
}

fn read_fee(reader: &mut ByteReader<'_>) -> Result<DelegationFee, TransactionError> {
    let start = reader.offset();
    let shares = reader.read_u32_be().reading("delegation shares")?;
    DelegationFee::from_shares(shares).map_err(|e| TransactionError::malformed(e.to_string(), start))
}

/// Add a primary network validator.
///
/// Body: `base tx | validator | num stake | stake outputs... |
/// rewards owner | shares u32`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddValidatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub stake: Vec<TransferableOutput<Output>>,
    pub rewards_owner: OutputOwners,
    pub delegation_fee: DelegationFee,
}

impl AddValidatorTx {
    /// Stake outputs are sorted canonically.
    pub fn new(
        base: BaseTx,
        validator: Validator,
        mut stake: Vec<TransferableOutput<Output>>,
        rewards_owner: OutputOwners,
        delegation_fee: DelegationFee,
        codec: Codec,
    ) -> Self {
        sort_outputs(&mut stake, codec);
        AddValidatorTx {
            base,
            validator,
            stake,
            rewards_owner,
            delegation_fee,
        }
    }
}

impl Encodable for AddValidatorTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        self.validator.write_to(writer, codec);
        write_list(writer, &self.stake, codec);
        write_owner(writer, &self.rewards_owner, codec);
        writer.write_u32_be(self.delegation_fee.shares());
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(AddValidatorTx {
            base: BaseTx::read_from(reader, codec)?,
            validator: Validator::read_from(reader, codec)?,
            stake: read_list(reader, codec, TRANSFERABLE_OUTPUT_MIN_SIZE)?,
            rewards_owner: read_owner(reader, codec)?,
            delegation_fee: read_fee(reader)?,
        })
    }
}

impl PlatformTx for AddValidatorTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }
}

/// Delegate stake to a primary network validator.
///
/// Body: `base tx | validator | num stake | stake outputs... | rewards owner`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddDelegatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub stake: Vec<TransferableOutput<Output>>,
    pub rewards_owner: OutputOwners,
}

impl AddDelegatorTx {
    pub fn new(
        base: BaseTx,
        validator: Validator,
        mut stake: Vec<TransferableOutput<Output>>,
        rewards_owner: OutputOwners,
        codec: Codec,
    ) -> Self {
        sort_outputs(&mut stake, codec);
        AddDelegatorTx {
            base,
            validator,
            stake,
            rewards_owner,
        }
    }
}

impl Encodable for AddDelegatorTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        self.validator.write_to(writer, codec);
        write_list(writer, &self.stake, codec);
        write_owner(writer, &self.rewards_owner, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(AddDelegatorTx {
            base: BaseTx::read_from(reader, codec)?,
            validator: Validator::read_from(reader, codec)?,
            stake: read_list(reader, codec, TRANSFERABLE_OUTPUT_MIN_SIZE)?,
            rewards_owner: read_owner(reader, codec)?,
        })
    }
}

impl PlatformTx for AddDelegatorTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }
}

/// Add a validator to a subnet, authorized by the subnet owners.
///
/// Body: `base tx | subnet validator | subnet auth`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddSubnetValidatorTx {
    pub base: BaseTx,
    pub validator: SubnetValidator,
    pub subnet_auth: SubnetAuth,
}

impl Encodable for AddSubnetValidatorTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        self.validator.write_to(writer, codec);
        write_auth(writer, &self.subnet_auth, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(AddSubnetValidatorTx {
            base: BaseTx::read_from(reader, codec)?,
            validator: SubnetValidator::read_from(reader, codec)?,
            subnet_auth: read_auth(reader, codec)?,
        })
    }
}

impl PlatformTx for AddSubnetValidatorTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }

    fn authorizations(&self, _codec: Codec) -> Vec<&SubnetAuth> {
        vec![&self.subnet_auth]
    }

    fn authorizations_mut(&mut self, _codec: Codec) -> Vec<&mut SubnetAuth> {
        vec![&mut self.subnet_auth]
    }
}

/// Remove a validator from a subnet.
///
/// Body: `base tx | node ID 20 | subnet ID 32 | subnet auth`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoveSubnetValidatorTx {
    pub base: BaseTx,
    pub node_id: NodeId,
    pub subnet_id: Id,
    pub subnet_auth: SubnetAuth,
}

impl Encodable for RemoveSubnetValidatorTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        writer.write_bytes(self.node_id.as_bytes());
        writer.write_bytes(self.subnet_id.as_bytes());
        write_auth(writer, &self.subnet_auth, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(RemoveSubnetValidatorTx {
            base: BaseTx::read_from(reader, codec)?,
            node_id: NodeId::new(reader.read_array().reading("node id")?),
            subnet_id: Id::new(reader.read_array().reading("subnet id")?),
            subnet_auth: read_auth(reader, codec)?,
        })
    }
}

impl PlatformTx for RemoveSubnetValidatorTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }

    fn authorizations(&self, _codec: Codec) -> Vec<&SubnetAuth> {
        vec![&self.subnet_auth]
    }

    fn authorizations_mut(&mut self, _codec: Codec) -> Vec<&mut SubnetAuth> {
        vec![&mut self.subnet_auth]
    }
}

/// A Camino validator: bonded rather than staked, and registered to a
/// node owner who must authorize it.
///
/// Body: `base tx | validator | num stake | stake outputs... |
/// rewards owner | shares u32 | node owner 20 | node owner auth`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaminoAddValidatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub stake: Vec<TransferableOutput<Output>>,
    pub rewards_owner: OutputOwners,
    pub delegation_fee: DelegationFee,
    pub node_owner: ShortId,
    pub node_owner_auth: SubnetAuth,
}

impl Encodable for CaminoAddValidatorTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        self.validator.write_to(writer, codec);
        write_list(writer, &self.stake, codec);
        write_owner(writer, &self.rewards_owner, codec);
        writer.write_u32_be(self.delegation_fee.shares());
        writer.write_bytes(self.node_owner.as_bytes());
        write_auth(writer, &self.node_owner_auth, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(CaminoAddValidatorTx {
            base: BaseTx::read_from(reader, codec)?,
            validator: Validator::read_from(reader, codec)?,
            stake: read_list(reader, codec, TRANSFERABLE_OUTPUT_MIN_SIZE)?,
            rewards_owner: read_owner(reader, codec)?,
            delegation_fee: read_fee(reader)?,
            node_owner: ShortId::new(reader.read_array().reading("node owner")?),
            node_owner_auth: read_auth(reader, codec)?,
        })
    }
}

impl PlatformTx for CaminoAddValidatorTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }

    fn authorizations(&self, _codec: Codec) -> Vec<&SubnetAuth> {
        vec![&self.node_owner_auth]
    }

    fn authorizations_mut(&mut self, _codec: Codec) -> Vec<&mut SubnetAuth> {
        vec![&mut self.node_owner_auth]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::auth_requirement;
    use crate::inputs::Credential;
    use camino_transaction::CredentialRequirement;

    #[test]
    fn test_validator_layout() {
        let v = Validator::new(NodeId::new([7; 20]), 100, 200, 2_000).unwrap();
        let bytes = v.to_bytes(Codec::V0);
        assert_eq!(bytes.len(), 20 + 24);
        assert_eq!(&bytes[20..28], &100u64.to_be_bytes());
        assert_eq!(Validator::from_bytes(&bytes, Codec::V0).unwrap(), v);
        assert!(Validator::new(NodeId::new([7; 20]), 200, 200, 1).is_err());
    }

    #[test]
    fn test_add_validator_rejects_fee_over_max() {
        let tx = AddValidatorTx {
            delegation_fee: DelegationFee::from_percent(100).unwrap(),
            rewards_owner: OutputOwners::single(ShortId::new([1; 20])),
            ..Default::default()
        };
        let mut bytes = tx.to_bytes(Codec::V0);
        assert_eq!(AddValidatorTx::from_bytes(&bytes, Codec::V0).unwrap(), tx);
        let n = bytes.len();
        bytes[n - 4..].copy_from_slice(&1_000_001u32.to_be_bytes());
        assert!(matches!(
            AddValidatorTx::from_bytes(&bytes, Codec::V0),
            Err(TransactionError::Malformed { offset, .. }) if offset == n - 4
        ));
    }

    #[test]
    fn test_subnet_auth_is_an_authorization() {
        let tx = AddSubnetValidatorTx {
            subnet_auth: SubnetAuth::from_signers(&[(0, ShortId::new([5; 20]))]),
            ..Default::default()
        };
        let requirements: Vec<CredentialRequirement<Credential>> =
            tx.authorizations(Codec::V0).into_iter().map(auth_requirement).collect();
        assert_eq!(requirements.len(), 1);
        assert_eq!(requirements[0].signers[0].source, Some(ShortId::new([5; 20])));
        let bytes = tx.to_bytes(Codec::V0);
        assert_eq!(AddSubnetValidatorTx::from_bytes(&bytes, Codec::V0).unwrap().subnet_auth.sig_indices.len(), 1);
    }
}
