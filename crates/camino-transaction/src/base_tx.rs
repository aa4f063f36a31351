//! The fields every transaction starts with.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::Id;

use crate::codec::{read_list, write_list, Codec, Encodable, ReadExt, Variant};
use crate::entity::{InputVariant, OutputVariant};
use crate::transferable::{
    resolve_input_signers, TransferableInput, TransferableOutput, TRANSFERABLE_INPUT_MIN_SIZE,
    TRANSFERABLE_OUTPUT_MIN_SIZE,
};
use crate::utxo_set::UtxoSet;
use crate::TransactionError;

/// Largest memo the network accepts.
pub const MAX_MEMO_SIZE: usize = 256;

/// Network, chain, inputs, outputs and memo.
///
/// Every transaction type embeds one of these and appends its own fields.
///
/// # Wire format
///
/// | Field          | Size                         |
/// |----------------|------------------------------|
/// | network ID     | 4 bytes (BE)                 |
/// | blockchain ID  | 32 bytes                     |
/// | num outputs    | 4 bytes (BE)                 |
/// | outputs        | `TransferableOutput` each    |
/// | num inputs     | 4 bytes (BE)                 |
/// | inputs         | `TransferableInput` each     |
/// | memo length    | 4 bytes (BE)                 |
/// | memo           | memo length bytes            |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTx<I, O> {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub outputs: Vec<TransferableOutput<O>>,
    pub inputs: Vec<TransferableInput<I>>,
    pub memo: Vec<u8>,
}

impl<I, O> Default for BaseTx<I, O> {
    fn default() -> Self {
        BaseTx {
            network_id: 0,
            blockchain_id: Id::ZERO,
            outputs: Vec::new(),
            inputs: Vec::new(),
            memo: Vec::new(),
        }
    }
}

impl<I: Variant, O: Variant> BaseTx<I, O> {
    pub fn new(network_id: u32, blockchain_id: Id) -> Self {
        BaseTx {
            network_id,
            blockchain_id,
            ..Default::default()
        }
    }

    /// Attach a memo, rejecting anything over `MAX_MEMO_SIZE`.
    pub fn with_memo(mut self, memo: impl Into<Vec<u8>>) -> Result<Self, TransactionError> {
        let memo = memo.into();
        if memo.len() > MAX_MEMO_SIZE {
            return Err(TransactionError::AmountOutOfRange(format!(
                "memo of {} bytes exceeds {}",
                memo.len(),
                MAX_MEMO_SIZE
            )));
        }
        self.memo = memo;
        Ok(self)
    }
}

impl<I: InputVariant, O: OutputVariant> BaseTx<I, O> {
    /// Resolve the signers of decoded inputs against `utxos`.
    pub fn resolve_signers(&mut self, utxos: &UtxoSet<O>) -> Result<usize, TransactionError> {
        resolve_input_signers(&mut self.inputs, utxos)
    }
}

impl<I: Variant, O: Variant> Encodable for BaseTx<I, O> {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_u32_be(self.network_id);
        writer.write_bytes(self.blockchain_id.as_bytes());
        write_list(writer, &self.outputs, codec);
        write_list(writer, &self.inputs, codec);
        writer.write_length_prefixed_bytes(&self.memo);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let network_id = reader.read_u32_be().reading("network id")?;
        let blockchain_id = Id::new(reader.read_array().reading("blockchain id")?);
        let outputs = read_list(reader, codec, TRANSFERABLE_OUTPUT_MIN_SIZE)?;
        let inputs = read_list(reader, codec, TRANSFERABLE_INPUT_MIN_SIZE)?;
        let memo = reader.read_length_prefixed_bytes().reading("memo")?.to_vec();
        Ok(BaseTx {
            network_id,
            blockchain_id,
            outputs,
            inputs,
            memo,
        })
    }
}
