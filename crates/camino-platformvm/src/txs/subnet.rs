//! Subnet and blockchain creation.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::Id;
use camino_transaction::codec::{Codec, Encodable, ReadExt};
use camino_transaction::{OutputOwners, SubnetAuth, TransactionError};

use super::{BaseTx, PlatformTx};
use crate::auth::{read_auth, write_auth};
use crate::outputs::{read_owner, write_owner};

/// Longest chain name.
pub const MAX_CHAIN_NAME_LEN: usize = 128;

/// Create a subnet controlled by `owner`.
///
/// Body: `base tx | owner`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateSubnetTx {
    pub base: BaseTx,
    pub owner: OutputOwners,
}

impl Encodable for CreateSubnetTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        write_owner(writer, &self.owner, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(CreateSubnetTx {
            base: BaseTx::read_from(reader, codec)?,
            owner: read_owner(reader, codec)?,
        })
    }
}

impl PlatformTx for CreateSubnetTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }
}

/// Create a blockchain inside a subnet.
///
/// Body: `base tx | subnet ID 32 | name (u16 len) | VM ID 32 |
/// num fx IDs | fx IDs 32 each | genesis (u32 len) | subnet auth`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateChainTx {
    pub base: BaseTx,
    pub subnet_id: Id,
    pub chain_name: String,
    pub vm_id: Id,
    pub fx_ids: Vec<Id>,
    pub genesis_data: Vec<u8>,
    pub subnet_auth: SubnetAuth,
}

impl CreateChainTx {
    /// Check the name and sort the feature extension IDs.
    pub fn new(
        base: BaseTx,
        subnet_id: Id,
        chain_name: impl Into<String>,
        vm_id: Id,
        mut fx_ids: Vec<Id>,
        genesis_data: Vec<u8>,
        subnet_auth: SubnetAuth,
    ) -> Result<Self, TransactionError> {
        let chain_name = chain_name.into();
        if chain_name.len() > MAX_CHAIN_NAME_LEN || !chain_name.is_ascii() {
            return Err(TransactionError::AmountOutOfRange(format!("chain name {:?}", chain_name)));
        }
        fx_ids.sort();
        fx_ids.dedup();
        Ok(CreateChainTx {
            base,
            subnet_id,
            chain_name,
            vm_id,
            fx_ids,
            genesis_data,
            subnet_auth,
        })
    }
}

impl Encodable for CreateChainTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        writer.write_bytes(self.subnet_id.as_bytes());
        writer.write_short_prefixed_bytes(self.chain_name.as_bytes());
        writer.write_bytes(self.vm_id.as_bytes());
        writer.write_length_prefixed_array(&self.fx_ids, |w, id| w.write_bytes(id.as_bytes()));
        writer.write_length_prefixed_bytes(&self.genesis_data);
        write_auth(writer, &self.subnet_auth, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let base = BaseTx::read_from(reader, codec)?;
        let subnet_id = Id::new(reader.read_array().reading("subnet id")?);
        let start = reader.offset();
        let name = reader.read_short_prefixed_bytes().reading("chain name")?;
        let chain_name = String::from_utf8(name.to_vec())
            .map_err(|_| TransactionError::malformed("chain name is not utf-8", start))?;
        let vm_id = Id::new(reader.read_array().reading("vm id")?);
        let fx_ids = reader.read_length_prefixed_array(32, |r| {
            Ok::<_, TransactionError>(Id::new(r.read_array().reading("fx id")?))
        })?;
        let genesis_data = reader.read_length_prefixed_bytes().reading("genesis data")?.to_vec();
        let subnet_auth = read_auth(reader, codec)?;
        Ok(CreateChainTx {
            base,
            subnet_id,
            chain_name,
            vm_id,
            fx_ids,
            genesis_data,
            subnet_auth,
        })
    }
}

impl PlatformTx for CreateChainTx {
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
