//! Operations: mint and NFT actions that consume non-value UTXOs.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::Id;
use camino_transaction::codec::{read_list, write_list, Codec, Domain, Encodable, ReadExt, Variant};
use camino_transaction::owners::OWNERS_MIN_SIZE;
use camino_transaction::secp::{SecpCredential, SecpTransferOutput};
use camino_transaction::{OutputOwners, SigIdx, TransactionError, UtxoId};

use crate::inputs::Credential;
use crate::outputs::{check_payload, NftTransferOutput, SecpMintOutput};
use crate::type_ids;

fn write_indices(writer: &mut ByteWriter, sig_indices: &[SigIdx]) {
    writer.write_length_prefixed_array(sig_indices, |w, s| w.write_u32_be(s.index));
}

fn read_indices(reader: &mut ByteReader<'_>) -> Result<Vec<SigIdx>, TransactionError> {
    reader.read_length_prefixed_array(4, |r| {
        Ok::<_, TransactionError>(SigIdx::new(r.read_u32_be().reading("signature index")?))
    })
}

/// Consume a mint output; produce a new mint output and minted value.
///
/// Body: `sig indices | mint output | transfer output`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecpMintOperation {
    pub sig_indices: Vec<SigIdx>,
    pub mint_output: SecpMintOutput,
    pub transfer_output: SecpTransferOutput,
}

impl Encodable for SecpMintOperation {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        write_indices(writer, &self.sig_indices);
        self.mint_output.write_to(writer, codec);
        self.transfer_output.write_to(writer, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(SecpMintOperation {
            sig_indices: read_indices(reader)?,
            mint_output: SecpMintOutput::read_from(reader, codec)?,
            transfer_output: SecpTransferOutput::read_from(reader, codec)?,
        })
    }
}

/// Mint NFTs of one group, one per owner set.
///
/// Body: `sig indices | group ID u32 | payload | num owners | owners...`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NftMintOperation {
    pub sig_indices: Vec<SigIdx>,
    pub group_id: u32,
    pub payload: Vec<u8>,
    pub outputs: Vec<OutputOwners>,
}

impl NftMintOperation {
    pub fn new(
        group_id: u32,
        payload: Vec<u8>,
        outputs: Vec<OutputOwners>,
    ) -> Result<Self, TransactionError> {
        check_payload(&payload)?;
        Ok(NftMintOperation {
            sig_indices: Vec::new(),
            group_id,
            payload,
            outputs,
        })
    }
}

impl Encodable for NftMintOperation {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        write_indices(writer, &self.sig_indices);
        writer.write_u32_be(self.group_id);
        writer.write_length_prefixed_bytes(&self.payload);
        write_list(writer, &self.outputs, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let sig_indices = read_indices(reader)?;
        let group_id = reader.read_u32_be().reading("nft group id")?;
        let start = reader.offset();
        let payload = reader.read_length_prefixed_bytes().reading("nft payload")?.to_vec();
        check_payload(&payload).map_err(|e| TransactionError::malformed(e.to_string(), start))?;
        let outputs = read_list(reader, codec, OWNERS_MIN_SIZE)?;
        Ok(NftMintOperation {
            sig_indices,
            group_id,
            payload,
            outputs,
        })
    }
}

/// Hand an NFT to new owners.
///
/// Body: `sig indices | NFT transfer output`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NftTransferOperation {
    pub sig_indices: Vec<SigIdx>,
    pub output: NftTransferOutput,
}

impl Encodable for NftTransferOperation {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        write_indices(writer, &self.sig_indices);
        self.output.write_to(writer, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(NftTransferOperation {
            sig_indices: read_indices(reader)?,
            output: NftTransferOutput::read_from(reader, codec)?,
        })
    }
}

/// Every operation the asset chain knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    SecpMint(SecpMintOperation),
    NftMint(NftMintOperation),
    NftTransfer(NftTransferOperation),
}

impl Operation {
    pub fn sig_indices(&self) -> &[SigIdx] {
        match self {
            Operation::SecpMint(op) => &op.sig_indices,
            Operation::NftMint(op) => &op.sig_indices,
            Operation::NftTransfer(op) => &op.sig_indices,
        }
    }

    pub fn sig_indices_mut(&mut self) -> &mut Vec<SigIdx> {
        match self {
            Operation::SecpMint(op) => &mut op.sig_indices,
            Operation::NftMint(op) => &mut op.sig_indices,
            Operation::NftTransfer(op) => &mut op.sig_indices,
        }
    }

    /// An empty credential of the kind that authorizes this operation.
    pub fn credential(&self) -> Credential {
        match self {
            Operation::SecpMint(_) => Credential::Secp(SecpCredential::default()),
            Operation::NftMint(_) | Operation::NftTransfer(_) => Credential::Nft(SecpCredential::default()),
        }
    }
}

impl Variant for Operation {
    const DOMAIN: Domain = Domain::Operation;

    fn select(type_id: u32, codec: Codec) -> Result<Self, TransactionError> {
        match (type_id, type_ids::extended(codec)) {
            (type_ids::SECP_MINT_OPERATION, false) | (type_ids::V1_SECP_MINT_OPERATION, true) => {
                Ok(Operation::SecpMint(SecpMintOperation::default()))
            }
            (type_ids::NFT_MINT_OPERATION, false) | (type_ids::V1_NFT_MINT_OPERATION, true) => {
                Ok(Operation::NftMint(NftMintOperation::default()))
            }
            (type_ids::NFT_TRANSFER_OPERATION, false) | (type_ids::V1_NFT_TRANSFER_OPERATION, true) => {
                Ok(Operation::NftTransfer(NftTransferOperation::default()))
            }
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, codec: Codec) -> u32 {
        let v1 = type_ids::extended(codec);
        match self {
            Operation::SecpMint(_) if v1 => type_ids::V1_SECP_MINT_OPERATION,
            Operation::SecpMint(_) => type_ids::SECP_MINT_OPERATION,
            Operation::NftMint(_) if v1 => type_ids::V1_NFT_MINT_OPERATION,
            Operation::NftMint(_) => type_ids::NFT_MINT_OPERATION,
            Operation::NftTransfer(_) if v1 => type_ids::V1_NFT_TRANSFER_OPERATION,
            Operation::NftTransfer(_) => type_ids::NFT_TRANSFER_OPERATION,
        }
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        match self {
            Operation::SecpMint(op) => op.write_to(writer, codec),
            Operation::NftMint(op) => op.write_to(writer, codec),
            Operation::NftTransfer(op) => op.write_to(writer, codec),
        }
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        match self {
            Operation::SecpMint(op) => *op = SecpMintOperation::read_from(reader, codec)?,
            Operation::NftMint(op) => *op = NftMintOperation::read_from(reader, codec)?,
            Operation::NftTransfer(op) => *op = NftTransferOperation::read_from(reader, codec)?,
        }
        Ok(())
    }
}

/// An operation on one asset, naming the UTXOs it consumes.
///
/// # Wire format
///
/// | Field      | Size                       |
/// |------------|----------------------------|
/// | asset ID   | 32 bytes                   |
/// | num UTXOs  | 4 bytes (BE)               |
/// | UTXO IDs   | tx ID 32 + index 4 each    |
/// | type ID    | 4 bytes (BE)               |
/// | operation  | variant body               |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableOperation {
    pub asset_id: Id,
    pub utxo_ids: Vec<UtxoId>,
    pub operation: Operation,
}

pub const TRANSFERABLE_OPERATION_MIN_SIZE: usize = 32 + 4 + 4;

impl TransferableOperation {
    /// UTXO IDs are kept sorted.
    pub fn new(asset_id: Id, mut utxo_ids: Vec<UtxoId>, operation: Operation) -> Self {
        utxo_ids.sort();
        TransferableOperation {
            asset_id,
            utxo_ids,
            operation,
        }
    }
}

impl Encodable for TransferableOperation {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_bytes(self.asset_id.as_bytes());
        writer.write_length_prefixed_array(&self.utxo_ids, |w, id| {
            w.write_bytes(id.tx_id.as_bytes());
            w.write_u32_be(id.output_index);
        });
        self.operation.write_typed(writer, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let asset_id = Id::new(reader.read_array().reading("operation asset id")?);
        let utxo_ids = reader.read_length_prefixed_array(36, |r| {
            let tx_id = Id::new(r.read_array().reading("operation utxo tx id")?);
            let index = r.read_u32_be().reading("operation utxo index")?;
            Ok::<_, TransactionError>(UtxoId::new(tx_id, index))
        })?;
        let operation = Operation::read_typed(reader, codec)?;
        Ok(TransferableOperation {
            asset_id,
            utxo_ids,
            operation,
        })
    }
}

/// Sort operations by their encoding.
pub fn sort_operations(ops: &mut [TransferableOperation], codec: Codec) {
    ops.sort_by_cached_key(|op| op.to_bytes(codec));
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_primitives::ShortId;

    fn owners(b: u8) -> OutputOwners {
        OutputOwners::single(ShortId::new([b; 20]))
    }

    #[test]
    fn test_mint_operation_roundtrip() {
        let op = TransferableOperation::new(
            Id::new([3; 32]),
            vec![UtxoId::new(Id::new([9; 32]), 1), UtxoId::new(Id::new([2; 32]), 0)],
            Operation::SecpMint(SecpMintOperation {
                sig_indices: vec![SigIdx::new(0)],
                mint_output: SecpMintOutput::new(owners(1)),
                transfer_output: SecpTransferOutput::new(500, owners(2)),
            }),
        );
        assert_eq!(op.utxo_ids[0].tx_id, Id::new([2; 32]));
        for codec in [Codec::V0, Codec::V1] {
            let bytes = op.to_bytes(codec);
            assert_eq!(TransferableOperation::from_bytes(&bytes, codec).unwrap(), op);
        }
    }

    #[test]
    fn test_nft_operations_use_nft_credential() {
        let mint = Operation::NftMint(NftMintOperation::new(1, b"x".to_vec(), vec![owners(1)]).unwrap());
        assert!(matches!(mint.credential(), Credential::Nft(_)));
        let secp = Operation::SecpMint(SecpMintOperation::default());
        assert!(matches!(secp.credential(), Credential::Secp(_)));
    }

    #[test]
    fn test_unknown_operation() {
        assert!(matches!(
            Operation::select(7, Codec::V0),
            Err(TransactionError::UnknownTypeId { domain: Domain::Operation, type_id: 7 })
        ));
        assert!(Operation::select(8, Codec::V1).is_err());
        assert!(Operation::select(65539, Codec::V1).is_ok());
    }
}
