//! Asset-tagged inputs and outputs as they appear inside transactions.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::Id;

use crate::codec::{Codec, Encodable, ReadExt, Variant};
use crate::entity::{InputVariant, OutputVariant};
use crate::utxo::UtxoId;
use crate::utxo_set::UtxoSet;
use crate::TransactionError;

/// Smallest encoded transferable output: asset ID and type ID.
pub const TRANSFERABLE_OUTPUT_MIN_SIZE: usize = 32 + 4;

/// Smallest encoded transferable input: tx ID, index, asset ID, type ID.
pub const TRANSFERABLE_INPUT_MIN_SIZE: usize = 32 + 4 + 32 + 4;

/// An output of a given asset.
///
/// # Wire format
///
/// | Field    | Size                 |
/// |----------|----------------------|
/// | asset ID | 32 bytes             |
/// | type ID  | 4 bytes (BE)         |
/// | output   | variant body         |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableOutput<O> {
    pub asset_id: Id,
    pub output: O,
}

impl<O> TransferableOutput<O> {
    pub fn new(asset_id: Id, output: O) -> Self {
        TransferableOutput { asset_id, output }
    }
}

impl<O: Variant> Encodable for TransferableOutput<O> {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_bytes(self.asset_id.as_bytes());
        self.output.write_typed(writer, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let asset_id = Id::new(reader.read_array().reading("output asset id")?);
        let output = O::read_typed(reader, codec)?;
        Ok(TransferableOutput { asset_id, output })
    }
}

/// A reference to a UTXO plus the input that spends it.
///
/// # Wire format
///
/// | Field        | Size           |
/// |--------------|----------------|
/// | tx ID        | 32 bytes       |
/// | output index | 4 bytes (BE)   |
/// | asset ID     | 32 bytes       |
/// | type ID      | 4 bytes (BE)   |
/// | input        | variant body   |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableInput<I> {
    pub tx_id: Id,
    pub output_index: u32,
    pub asset_id: Id,
    pub input: I,
}

impl<I> TransferableInput<I> {
    pub fn new(tx_id: Id, output_index: u32, asset_id: Id, input: I) -> Self {
        TransferableInput {
            tx_id,
            output_index,
            asset_id,
            input,
        }
    }

    /// The UTXO this input consumes.
    pub fn utxo_id(&self) -> UtxoId {
        UtxoId::new(self.tx_id, self.output_index)
    }
}

impl<I: Variant> Encodable for TransferableInput<I> {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_bytes(self.tx_id.as_bytes());
        writer.write_u32_be(self.output_index);
        writer.write_bytes(self.asset_id.as_bytes());
        self.input.write_typed(writer, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let tx_id = Id::new(reader.read_array().reading("input tx id")?);
        let output_index = reader.read_u32_be().reading("input output index")?;
        let asset_id = Id::new(reader.read_array().reading("input asset id")?);
        let input = I::read_typed(reader, codec)?;
        Ok(TransferableInput {
            tx_id,
            output_index,
            asset_id,
            input,
        })
    }
}

/// Sort outputs by asset ID, then by their typed encoding.
pub fn sort_outputs<O: Variant>(outputs: &mut [TransferableOutput<O>], codec: Codec) {
    outputs.sort_by_cached_key(|o| (o.asset_id, o.output.to_typed_bytes(codec)));
}

/// Sort inputs by the UTXO they consume.
pub fn sort_inputs<I>(inputs: &mut [TransferableInput<I>]) {
    inputs.sort_by_key(|i| (i.tx_id, i.output_index));
}

/// Whether outputs are in canonical order.
pub fn outputs_sorted<O: Variant>(outputs: &[TransferableOutput<O>], codec: Codec) -> bool {
    outputs.windows(2).all(|w| {
        (w[0].asset_id, w[0].output.to_typed_bytes(codec))
            <= (w[1].asset_id, w[1].output.to_typed_bytes(codec))
    })
}

/// Whether inputs are in canonical order with no UTXO consumed twice.
pub fn inputs_sorted_unique<I>(inputs: &[TransferableInput<I>]) -> bool {
    inputs
        .windows(2)
        .all(|w| (w[0].tx_id, w[0].output_index) < (w[1].tx_id, w[1].output_index))
}

/// Attach signing addresses to inputs from the UTXOs they spend.
///
/// Decoded inputs carry bare signature indices; this maps each index to
/// the owner address at that position.  Inputs whose UTXO is not in
/// `utxos` are left untouched.  Returns the number of inputs resolved.
pub fn resolve_input_signers<I: InputVariant, O: OutputVariant>(
    inputs: &mut [TransferableInput<I>],
    utxos: &UtxoSet<O>,
) -> Result<usize, TransactionError> {
    let mut resolved = 0;
    for input in inputs.iter_mut() {
        let Some(utxo) = utxos.get(&input.utxo_id()) else {
            continue;
        };
        let addresses = utxo.owners().addresses();
        for sig in input.input.sig_indices_mut() {
            let address = addresses
                .get(sig.index as usize)
                .ok_or(TransactionError::UnresolvedSigIdx { index: sig.index })?;
            sig.source = Some(*address);
        }
        resolved += 1;
    }
    Ok(resolved)
}
