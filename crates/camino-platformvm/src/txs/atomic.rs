//! Cross-chain transfers through shared memory.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::Id;
use camino_transaction::codec::{read_list, write_list, Codec, Encodable, ReadExt};
use camino_transaction::transferable::{
    sort_inputs, sort_outputs, TRANSFERABLE_INPUT_MIN_SIZE, TRANSFERABLE_OUTPUT_MIN_SIZE,
};
use camino_transaction::{TransactionError, TransferableInput, TransferableOutput};

use super::{BaseTx, PlatformTx};
use crate::inputs::Input;
use crate::outputs::Output;

/// Consume UTXOs another chain exported to this one.
///
/// Body: `base tx | source chain 32 | num inputs | transferable inputs...`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportTx {
    pub base: BaseTx,
    pub source_chain: Id,
    pub imported_inputs: Vec<TransferableInput<Input>>,
}

impl ImportTx {
    pub fn new(base: BaseTx, source_chain: Id, mut imported_inputs: Vec<TransferableInput<Input>>) -> Self {
        sort_inputs(&mut imported_inputs);
        ImportTx {
            base,
            source_chain,
            imported_inputs,
        }
    }
}

impl Encodable for ImportTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        writer.write_bytes(self.source_chain.as_bytes());
        write_list(writer, &self.imported_inputs, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(ImportTx {
            base: BaseTx::read_from(reader, codec)?,
            source_chain: Id::new(reader.read_array().reading("source chain")?),
            imported_inputs: read_list(reader, codec, TRANSFERABLE_INPUT_MIN_SIZE)?,
        })
    }
}

impl PlatformTx for ImportTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }
}

/// Move value into another chain's shared memory.
///
/// Body: `base tx | destination chain 32 | num outputs | transferable outputs...`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportTx {
    pub base: BaseTx,
    pub destination_chain: Id,
    pub exported_outputs: Vec<TransferableOutput<Output>>,
}

impl ExportTx {
    /// Exported outputs are sorted canonically.
    pub fn new(
        base: BaseTx,
        destination_chain: Id,
        mut exported_outputs: Vec<TransferableOutput<Output>>,
        codec: Codec,
    ) -> Self {
        sort_outputs(&mut exported_outputs, codec);
        ExportTx {
            base,
            destination_chain,
            exported_outputs,
        }
    }
}

impl Encodable for ExportTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        writer.write_bytes(self.destination_chain.as_bytes());
        write_list(writer, &self.exported_outputs, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(ExportTx {
            base: BaseTx::read_from(reader, codec)?,
            destination_chain: Id::new(reader.read_array().reading("destination chain")?),
            exported_outputs: read_list(reader, codec, TRANSFERABLE_OUTPUT_MIN_SIZE)?,
        })
    }
}

impl PlatformTx for ExportTx {
    fn base(&self) -> &BaseTx {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        &mut self.base
    }
}
