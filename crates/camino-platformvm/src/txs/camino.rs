//! Camino transactions: address roles, deposits, claims, node
//! registration and multisig aliases.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::{Id, NodeId, ShortId};
use camino_transaction::base_tx::MAX_MEMO_SIZE;
use camino_transaction::codec::{Codec, Encodable, ReadExt};
use camino_transaction::{OutputOwners, SubnetAuth, TransactionError};

use super::{BaseTx, PlatformTx};
use crate::auth::{read_auth, write_auth};
use crate::outputs::{read_owner, write_owner};
use crate::type_ids;

/// Bit positions of the address state flags.
pub mod address_state {
    pub const ROLE_ADMIN: u8 = 0;
    pub const ROLE_KYC: u8 = 1;
    pub const ROLE_OFFERS_ADMIN: u8 = 2;
    pub const KYC_VERIFIED: u8 = 32;
    pub const KYC_EXPIRED: u8 = 33;
    pub const CONSORTIUM: u8 = 38;
    pub const NODE_DEFERRED: u8 = 39;
    pub const OFFERS_CREATOR: u8 = 50;
    /// Highest valid bit.
    pub const MAX: u8 = 63;
}

fn read_bool(reader: &mut ByteReader<'_>, what: &str) -> Result<bool, TransactionError> {
    let start = reader.offset();
    match reader.read_u8().reading(what)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(TransactionError::malformed(format!("{} is {}, not a bool", what, other), start)),
    }
}

fn read_short_id(reader: &mut ByteReader<'_>, what: &str) -> Result<ShortId, TransactionError> {
    Ok(ShortId::new(reader.read_array().reading(what)?))
}

/// Set or clear one state flag of an address.
///
/// Body: `base tx | address 20 | state u8 | remove u8` and, under codec 1,
/// `| executor 20 | executor auth`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressStateTx {
    pub base: BaseTx,
    pub address: ShortId,
    pub state: u8,
    pub remove: bool,
    pub executor: ShortId,
    pub executor_auth: SubnetAuth,
}

impl AddressStateTx {
    pub fn new(base: BaseTx, address: ShortId, state: u8, remove: bool) -> Result<Self, TransactionError> {
        if state > address_state::MAX {
            return Err(TransactionError::AmountOutOfRange(format!("address state bit {}", state)));
        }
        Ok(AddressStateTx {
            base,
            address,
            state,
            remove,
            ..Default::default()
        })
    }

    /// Name the executor and how it authorizes; only encoded under codec 1.
    pub fn with_executor(mut self, executor: ShortId, executor_auth: SubnetAuth) -> Self {
        self.executor = executor;
        self.executor_auth = executor_auth;
        self
    }
}

impl Encodable for AddressStateTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        writer.write_bytes(self.address.as_bytes());
        writer.write_u8(self.state);
        writer.write_u8(u8::from(self.remove));
        if type_ids::has_creator_auth(codec) {
            writer.write_bytes(self.executor.as_bytes());
            write_auth(writer, &self.executor_auth, codec);
        }
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let base = BaseTx::read_from(reader, codec)?;
        let address = read_short_id(reader, "address")?;
        let start = reader.offset();
        let state = reader.read_u8().reading("address state")?;
        if state > address_state::MAX {
            return Err(TransactionError::malformed(format!("address state bit {}", state), start));
        }
        let remove = read_bool(reader, "remove flag")?;
        let mut tx = AddressStateTx {
            base,
            address,
            state,
            remove,
            ..Default::default()
        };
        if type_ids::has_creator_auth(codec) {
            tx.executor = read_short_id(reader, "executor")?;
            tx.executor_auth = read_auth(reader, codec)?;
        }
        Ok(tx)
    }
}

impl PlatformTx for AddressStateTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }

    fn authorizations(&self, codec: Codec) -> Vec<&SubnetAuth> {
        if type_ids::has_creator_auth(codec) {
            vec![&self.executor_auth]
        } else {
            Vec::new()
        }
    }

    fn authorizations_mut(&mut self, codec: Codec) -> Vec<&mut SubnetAuth> {
        if type_ids::has_creator_auth(codec) {
            vec![&mut self.executor_auth]
        } else {
            Vec::new()
        }
    }
}

/// Deposit funds under a deposit offer.
///
/// Body: `base tx | offer ID 32 | duration u32 | rewards owner` and, under
/// codec 1, `| deposit creator 20 | deposit creator auth`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepositTx {
    pub base: BaseTx,
    pub deposit_offer_id: Id,
    pub deposit_duration: u32,
    pub rewards_owner: OutputOwners,
    pub deposit_creator: ShortId,
    pub deposit_creator_auth: SubnetAuth,
}

impl Encodable for DepositTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        writer.write_bytes(self.deposit_offer_id.as_bytes());
        writer.write_u32_be(self.deposit_duration);
        write_owner(writer, &self.rewards_owner, codec);
        if type_ids::has_creator_auth(codec) {
            writer.write_bytes(self.deposit_creator.as_bytes());
            write_auth(writer, &self.deposit_creator_auth, codec);
        }
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let mut tx = DepositTx {
            base: BaseTx::read_from(reader, codec)?,
            deposit_offer_id: Id::new(reader.read_array().reading("deposit offer id")?),
            deposit_duration: reader.read_u32_be().reading("deposit duration")?,
            rewards_owner: read_owner(reader, codec)?,
            ..Default::default()
        };
        if type_ids::has_creator_auth(codec) {
            tx.deposit_creator = read_short_id(reader, "deposit creator")?;
            tx.deposit_creator_auth = read_auth(reader, codec)?;
        }
        Ok(tx)
    }
}

impl PlatformTx for DepositTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }

    fn authorizations(&self, codec: Codec) -> Vec<&SubnetAuth> {
        if type_ids::has_creator_auth(codec) {
            vec![&self.deposit_creator_auth]
        } else {
            Vec::new()
        }
    }

    fn authorizations_mut(&mut self, codec: Codec) -> Vec<&mut SubnetAuth> {
        if type_ids::has_creator_auth(codec) {
            vec![&mut self.deposit_creator_auth]
        } else {
            Vec::new()
        }
    }
}

/// Release deposited funds.  The inputs name the deposits; the body is a
/// plain base transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnlockDepositTx {
    pub base: BaseTx,
}

impl Encodable for UnlockDepositTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(UnlockDepositTx {
            base: BaseTx::read_from(reader, codec)?,
        })
    }
}

impl PlatformTx for UnlockDepositTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }
}

/// What a claim draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClaimType {
    #[default]
    ValidatorReward,
    ExpiredDepositReward,
    AllTreasury,
    ActiveDepositReward,
}

impl ClaimType {
    pub fn to_u64(self) -> u64 {
        match self {
            ClaimType::ValidatorReward => 0,
            ClaimType::ExpiredDepositReward => 1,
            ClaimType::AllTreasury => 2,
            ClaimType::ActiveDepositReward => 3,
        }
    }
}

impl TryFrom<u64> for ClaimType {
    type Error = u64;

    fn try_from(value: u64) -> Result<Self, u64> {
        match value {
            0 => Ok(ClaimType::ValidatorReward),
            1 => Ok(ClaimType::ExpiredDepositReward),
            2 => Ok(ClaimType::AllTreasury),
            3 => Ok(ClaimType::ActiveDepositReward),
            other => Err(other),
        }
    }
}

/// One claimed amount and the authorization of its owner.
///
/// Body: `owner ID 32 | claim type u64 | amount u64 | auth`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Claimable {
    pub owner_id: Id,
    pub claim_type: ClaimType,
    pub amount: u64,
    pub auth: SubnetAuth,
}

impl Encodable for Claimable {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_bytes(self.owner_id.as_bytes());
        writer.write_u64_be(self.claim_type.to_u64());
        writer.write_u64_be(self.amount);
        write_auth(writer, &self.auth, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let owner_id = Id::new(reader.read_array().reading("claim owner id")?);
        let start = reader.offset();
        let claim_type = ClaimType::try_from(reader.read_u64_be().reading("claim type")?)
            .map_err(|t| TransactionError::malformed(format!("unknown claim type {}", t), start))?;
        Ok(Claimable {
            owner_id,
            claim_type,
            amount: reader.read_u64_be().reading("claim amount")?,
            auth: read_auth(reader, codec)?,
        })
    }
}

/// Claim rewards or treasury funds to `claim_to`.
///
/// Body: `base tx | num claimables | claimables... | claim to`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClaimTx {
    pub base: BaseTx,
    pub claimables: Vec<Claimable>,
    pub claim_to: OutputOwners,
}

impl Encodable for ClaimTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        writer.write_length_prefixed_array(&self.claimables, |w, c| c.write_to(w, codec));
        write_owner(writer, &self.claim_to, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(ClaimTx {
            base: BaseTx::read_from(reader, codec)?,
            claimables: reader.read_length_prefixed_array(32 + 16 + 8, |r| Claimable::read_from(r, codec))?,
            claim_to: read_owner(reader, codec)?,
        })
    }
}

impl PlatformTx for ClaimTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }

    fn authorizations(&self, _codec: Codec) -> Vec<&SubnetAuth> {
        self.claimables.iter().map(|c| &c.auth).collect()
    }

    fn authorizations_mut(&mut self, _codec: Codec) -> Vec<&mut SubnetAuth> {
        self.claimables.iter_mut().map(|c| &mut c.auth).collect()
    }
}

/// Link a node to a consortium member, replacing `old_node_id` if set.
///
/// Body: `base tx | old node ID 20 | new node ID 20 | member auth |
/// member address 20`.  Signed by the member's owners and then by the new
/// node's own key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterNodeTx {
    pub base: BaseTx,
    pub old_node_id: NodeId,
    pub new_node_id: NodeId,
    pub consortium_member_auth: SubnetAuth,
    pub consortium_member_address: ShortId,
}

impl Encodable for RegisterNodeTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        writer.write_bytes(self.old_node_id.as_bytes());
        writer.write_bytes(self.new_node_id.as_bytes());
        write_auth(writer, &self.consortium_member_auth, codec);
        writer.write_bytes(self.consortium_member_address.as_bytes());
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(RegisterNodeTx {
            base: BaseTx::read_from(reader, codec)?,
            old_node_id: NodeId::new(reader.read_array().reading("old node id")?),
            new_node_id: NodeId::new(reader.read_array().reading("new node id")?),
            consortium_member_auth: read_auth(reader, codec)?,
            consortium_member_address: read_short_id(reader, "consortium member address")?,
        })
    }
}

impl PlatformTx for RegisterNodeTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }

    fn authorizations(&self, _codec: Codec) -> Vec<&SubnetAuth> {
        vec![&self.consortium_member_auth]
    }

    fn authorizations_mut(&mut self, _codec: Codec) -> Vec<&mut SubnetAuth> {
        vec![&mut self.consortium_member_auth]
    }

    fn node_signer(&self) -> Option<ShortId> {
        (self.new_node_id != NodeId::default()).then(|| self.new_node_id.to_short_id())
    }
}

/// An alias address and the owners that act for it.
///
/// Body: `alias ID 20 | memo (u32 len) | owners`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultisigAlias {
    pub id: ShortId,
    pub memo: Vec<u8>,
    pub owners: OutputOwners,
}

impl MultisigAlias {
    pub fn new(id: ShortId, memo: Vec<u8>, owners: OutputOwners) -> Result<Self, TransactionError> {
        if memo.len() > MAX_MEMO_SIZE {
            return Err(TransactionError::AmountOutOfRange(format!(
                "alias memo of {} bytes",
                memo.len()
            )));
        }
        Ok(MultisigAlias { id, memo, owners })
    }
}

impl Encodable for MultisigAlias {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_bytes(self.id.as_bytes());
        writer.write_length_prefixed_bytes(&self.memo);
        write_owner(writer, &self.owners, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let id = read_short_id(reader, "alias id")?;
        let start = reader.offset();
        let memo = reader.read_length_prefixed_bytes().reading("alias memo")?.to_vec();
        if memo.len() > MAX_MEMO_SIZE {
            return Err(TransactionError::malformed(
                format!("alias memo of {} bytes", memo.len()),
                start,
            ));
        }
        Ok(MultisigAlias {
            id,
            memo,
            owners: read_owner(reader, codec)?,
        })
    }
}

/// Create or update a multisig alias.  A zero alias ID creates a new one.
///
/// Body: `base tx | alias | auth`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultisigAliasTx {
    pub base: BaseTx,
    pub alias: MultisigAlias,
    pub auth: SubnetAuth,
}

impl Encodable for MultisigAliasTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        self.alias.write_to(writer, codec);
        write_auth(writer, &self.auth, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(MultisigAliasTx {
            base: BaseTx::read_from(reader, codec)?,
            alias: MultisigAlias::read_from(reader, codec)?,
            auth: read_auth(reader, codec)?,
        })
    }
}

impl PlatformTx for MultisigAliasTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }

    fn authorizations(&self, _codec: Codec) -> Vec<&SubnetAuth> {
        vec![&self.auth]
    }

    fn authorizations_mut(&mut self, _codec: Codec) -> Vec<&mut SubnetAuth> {
        vec![&mut self.auth]
    }
}
