//! Asset chain outputs.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_transaction::codec::{Codec, Domain, Encodable, ReadExt, Variant};
use camino_transaction::secp::SecpTransferOutput;
use camino_transaction::{LockState, OutputOwners, OutputVariant, TransactionError};

use crate::type_ids;

/// Largest NFT payload the chain accepts.
pub const MAX_NFT_PAYLOAD_SIZE: usize = 1024;

/// Grants the right to mint more of a variable-cap asset.
///
/// The body is a bare owner set: `locktime | threshold | addresses`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecpMintOutput {
    pub owners: OutputOwners,
}

impl SecpMintOutput {
    pub fn new(owners: OutputOwners) -> Self {
        SecpMintOutput { owners }
    }
}

impl Encodable for SecpMintOutput {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.owners.write_to(writer, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(SecpMintOutput {
            owners: OutputOwners::read_from(reader, codec)?,
        })
    }
}

/// Grants the right to mint NFTs of one group.
///
/// Body: `group ID u32 | owners`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NftMintOutput {
    pub group_id: u32,
    pub owners: OutputOwners,
}

impl Encodable for NftMintOutput {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_u32_be(self.group_id);
        self.owners.write_to(writer, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let group_id = reader.read_u32_be().reading("nft group id")?;
        let owners = OutputOwners::read_from(reader, codec)?;
        Ok(NftMintOutput { group_id, owners })
    }
}

pub(crate) fn check_payload(payload: &[u8]) -> Result<(), TransactionError> {
    if payload.len() > MAX_NFT_PAYLOAD_SIZE {
        return Err(TransactionError::AmountOutOfRange(format!(
            "nft payload of {} bytes exceeds {}",
            payload.len(),
            MAX_NFT_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

/// One NFT.
///
/// Body: `group ID u32 | payload length u32 | payload | owners`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NftTransferOutput {
    pub group_id: u32,
    pub payload: Vec<u8>,
    pub owners: OutputOwners,
}

impl NftTransferOutput {
    pub fn new(group_id: u32, payload: Vec<u8>, owners: OutputOwners) -> Result<Self, TransactionError> {
        check_payload(&payload)?;
        Ok(NftTransferOutput {
            group_id,
            payload,
            owners,
        })
    }
}

impl Encodable for NftTransferOutput {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_u32_be(self.group_id);
        writer.write_length_prefixed_bytes(&self.payload);
        self.owners.write_to(writer, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let group_id = reader.read_u32_be().reading("nft group id")?;
        let start = reader.offset();
        let payload = reader.read_length_prefixed_bytes().reading("nft payload")?.to_vec();
        check_payload(&payload).map_err(|e| TransactionError::malformed(e.to_string(), start))?;
        let owners = OutputOwners::read_from(reader, codec)?;
        Ok(NftTransferOutput {
            group_id,
            payload,
            owners,
        })
    }
}

/// Every output the asset chain knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    SecpTransfer(SecpTransferOutput),
    SecpMint(SecpMintOutput),
    NftMint(NftMintOutput),
    NftTransfer(NftTransferOutput),
}

impl Output {
    /// Plain transfer of `amount` to `owners`.
    pub fn transfer(amount: u64, owners: OutputOwners) -> Self {
        Output::SecpTransfer(SecpTransferOutput::new(amount, owners))
    }

    /// Feature extension this output belongs to: 0 for SECP, 1 for NFT.
    pub fn fx_id(&self) -> u32 {
        match self {
            Output::SecpTransfer(_) | Output::SecpMint(_) => type_ids::SECP_FX_ID,
            Output::NftMint(_) | Output::NftTransfer(_) => type_ids::NFT_FX_ID,
        }
    }
}

impl Variant for Output {
    const DOMAIN: Domain = Domain::Output;

    fn select(type_id: u32, codec: Codec) -> Result<Self, TransactionError> {
        match (type_id, type_ids::extended(codec)) {
            (type_ids::SECP_TRANSFER_OUTPUT, false) | (type_ids::V1_SECP_TRANSFER_OUTPUT, true) => {
                Ok(Output::SecpTransfer(SecpTransferOutput::default()))
            }
            (type_ids::SECP_MINT_OUTPUT, false) | (type_ids::V1_SECP_MINT_OUTPUT, true) => {
                Ok(Output::SecpMint(SecpMintOutput::default()))
            }
            (type_ids::NFT_MINT_OUTPUT, false) | (type_ids::V1_NFT_MINT_OUTPUT, true) => {
                Ok(Output::NftMint(NftMintOutput::default()))
            }
            (type_ids::NFT_TRANSFER_OUTPUT, false) | (type_ids::V1_NFT_TRANSFER_OUTPUT, true) => {
                Ok(Output::NftTransfer(NftTransferOutput::default()))
            }
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, codec: Codec) -> u32 {
        let v1 = type_ids::extended(codec);
        match self {
            Output::SecpTransfer(_) if v1 => type_ids::V1_SECP_TRANSFER_OUTPUT,
            Output::SecpTransfer(_) => type_ids::SECP_TRANSFER_OUTPUT,
            Output::SecpMint(_) if v1 => type_ids::V1_SECP_MINT_OUTPUT,
            Output::SecpMint(_) => type_ids::SECP_MINT_OUTPUT,
            Output::NftMint(_) if v1 => type_ids::V1_NFT_MINT_OUTPUT,
            Output::NftMint(_) => type_ids::NFT_MINT_OUTPUT,
            Output::NftTransfer(_) if v1 => type_ids::V1_NFT_TRANSFER_OUTPUT,
            Output::NftTransfer(_) => type_ids::NFT_TRANSFER_OUTPUT,
        }
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        match self {
            Output::SecpTransfer(o) => o.write_to(writer, codec),
            Output::SecpMint(o) => o.write_to(writer, codec),
            Output::NftMint(o) => o.write_to(writer, codec),
            Output::NftTransfer(o) => o.write_to(writer, codec),
        }
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        match self {
            Output::SecpTransfer(o) => *o = SecpTransferOutput::read_from(reader, codec)?,
            Output::SecpMint(o) => *o = SecpMintOutput::read_from(reader, codec)?,
            Output::NftMint(o) => *o = NftMintOutput::read_from(reader, codec)?,
            Output::NftTransfer(o) => *o = NftTransferOutput::read_from(reader, codec)?,
        }
        Ok(())
    }
}

impl OutputVariant for Output {
    fn amount(&self) -> u64 {
        match self {
            Output::SecpTransfer(o) => o.amount,
            _ => 0,
        }
    }

    fn owners(&self) -> &OutputOwners {
        match self {
            Output::SecpTransfer(o) => &o.owners,
            Output::SecpMint(o) => &o.owners,
            Output::NftMint(o) => &o.owners,
            Output::NftTransfer(o) => &o.owners,
        }
    }

    fn locked(amount: u64, owners: OutputOwners, lock: &LockState) -> Result<Self, TransactionError> {
        match lock {
            LockState::Unlocked => Ok(Output::transfer(amount, owners)),
            other => Err(TransactionError::UnsupportedLock(format!(
                "asset chain outputs cannot be {:?}",
                other
            ))),
        }
    }
}
