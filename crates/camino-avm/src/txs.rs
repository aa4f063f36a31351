//! Asset chain transactions.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::Id;
use camino_transaction::codec::{
    read_list, read_typed_list, write_list, write_typed_list, Codec, Domain, Encodable, ReadExt, Variant,
};
use camino_transaction::transferable::{
    resolve_input_signers, sort_outputs, TRANSFERABLE_INPUT_MIN_SIZE, TRANSFERABLE_OUTPUT_MIN_SIZE,
};
use camino_transaction::{
    CredentialRequirement, InputVariant, TransactionError, TransferableInput, TransferableOutput, UtxoSet,
};

use crate::inputs::{Credential, Input};
use crate::operations::{TransferableOperation, TRANSFERABLE_OPERATION_MIN_SIZE};
use crate::outputs::Output;
use crate::type_ids;

pub type BaseTx = camino_transaction::BaseTx<Input, Output>;

/// Largest asset name.
pub const MAX_NAME_LEN: usize = 128;
/// Largest asset symbol.
pub const MAX_SYMBOL_LEN: usize = 4;
/// Largest number of decimal places.
pub const MAX_DENOMINATION: u8 = 32;

/// Outputs an asset starts with, grouped by feature extension.
///
/// Body: `fx ID u32 | num outputs | (type ID | output)...`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InitialState {
    pub fx_id: u32,
    pub outputs: Vec<Output>,
}

impl InitialState {
    /// Outputs are kept in encoding order.
    pub fn new(fx_id: u32, mut outputs: Vec<Output>, codec: Codec) -> Self {
        outputs.sort_by_cached_key(|o| o.to_typed_bytes(codec));
        InitialState { fx_id, outputs }
    }
}

impl Encodable for InitialState {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_u32_be(self.fx_id);
        write_typed_list(writer, &self.outputs, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let fx_id = reader.read_u32_be().reading("fx id")?;
        let outputs = read_typed_list(reader, codec)?;
        Ok(InitialState { fx_id, outputs })
    }
}

/// Create a new asset.
///
/// Body: `base tx | name (u16 len) | symbol (u16 len) | denomination u8 |
/// num initial states | initial states...`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateAssetTx {
    pub base: BaseTx,
    pub name: String,
    pub symbol: String,
    pub denomination: u8,
    pub initial_states: Vec<InitialState>,
}

impl CreateAssetTx {
    /// Check name, symbol and denomination limits and sort initial states by fx ID.
    pub fn new(
        base: BaseTx,
        name: impl Into<String>,
        symbol: impl Into<String>,
        denomination: u8,
        mut initial_states: Vec<InitialState>,
    ) -> Result<Self, TransactionError> {
        let name = name.into();
        let symbol = symbol.into();
        if name.is_empty() || name.len() > MAX_NAME_LEN || !name.is_ascii() {
            return Err(TransactionError::AmountOutOfRange(format!("asset name {:?}", name)));
        }
        if symbol.len() > MAX_SYMBOL_LEN || !symbol.is_ascii() {
            return Err(TransactionError::AmountOutOfRange(format!("asset symbol {:?}", symbol)));
        }
        if denomination > MAX_DENOMINATION {
            return Err(TransactionError::AmountOutOfRange(format!(
                "denomination {} exceeds {}",
                denomination, MAX_DENOMINATION
            )));
        }
        initial_states.sort_by_key(|s| s.fx_id);
        Ok(CreateAssetTx {
            base,
            name,
            symbol,
            denomination,
            initial_states,
        })
    }
}

fn read_string(reader: &mut ByteReader<'_>, what: &str) -> Result<String, TransactionError> {
    let start = reader.offset();
    let bytes = reader.read_short_prefixed_bytes().reading(what)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| TransactionError::malformed(format!("{} is not utf-8", what), start))
}

impl Encodable for CreateAssetTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        writer.write_short_prefixed_bytes(self.name.as_bytes());
        writer.write_short_prefixed_bytes(self.symbol.as_bytes());
        writer.write_u8(self.denomination);
        write_list(writer, &self.initial_states, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(CreateAssetTx {
            base: BaseTx::read_from(reader, codec)?,
            name: read_string(reader, "asset name")?,
            symbol: read_string(reader, "asset symbol")?,
            denomination: reader.read_u8().reading("denomination")?,
            initial_states: read_list(reader, codec, 8)?,
        })
    }
}

/// Apply operations to non-value UTXOs.
///
/// Body: `base tx | num ops | transferable operations...`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperationTx {
    pub base: BaseTx,
    pub operations: Vec<TransferableOperation>,
}

impl Encodable for OperationTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        self.base.write_to(writer, codec);
        write_list(writer, &self.operations, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(OperationTx {
            base: BaseTx::read_from(reader, codec)?,
            operations: read_list(reader, codec, TRANSFERABLE_OPERATION_MIN_SIZE)?,
        })
    }
}

/// Consume UTXOs exported to this chain from another.
///
/// Body: `base tx | source chain 32 | num inputs | transferable inputs...`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportTx {
    pub base: BaseTx,
    pub source_chain: Id,
    pub imported_inputs: Vec<TransferableInput<Input>>,
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

/// Move value to another chain's shared memory.
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

/// Every transaction the asset chain knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Base(BaseTx),
    CreateAsset(CreateAssetTx),
    Operation(OperationTx),
    Import(ImportTx),
    Export(ExportTx),
}

fn input_requirement(input: &TransferableInput<Input>) -> CredentialRequirement<Credential> {
    CredentialRequirement::new(input.input.credential(), input.input.sig_indices().to_vec())
}

impl Transaction {
    pub fn base(&self) -> &BaseTx {
        match self {
            Transaction::Base(tx) => tx,
            Transaction::CreateAsset(tx) => &tx.base,
            Transaction::Operation(tx) => &tx.base,
            Transaction::Import(tx) => &tx.base,
            Transaction::Export(tx) => &tx.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BaseTx {
        match self {
            Transaction::Base(tx) => tx,
            Transaction::CreateAsset(tx) => &mut tx.base,
            Transaction::Operation(tx) => &mut tx.base,
            Transaction::Import(tx) => &mut tx.base,
            Transaction::Export(tx) => &mut tx.base,
        }
    }

    /// Base inputs first, then imported inputs, then one per operation.
    pub fn credential_requirements(&self) -> Vec<CredentialRequirement<Credential>> {
        let mut requirements: Vec<_> = self.base().inputs.iter().map(input_requirement).collect();
        match self {
            Transaction::Import(tx) => {
                requirements.extend(tx.imported_inputs.iter().map(input_requirement));
            }
            Transaction::Operation(tx) => {
                requirements.extend(tx.operations.iter().map(|op| {
                    CredentialRequirement::new(op.operation.credential(), op.operation.sig_indices().to_vec())
                }));
            }
            _ => {}
        }
        requirements
    }

    /// Attach signing addresses after decoding.
    ///
    /// `utxos` covers base inputs and operations; `imported` covers
    /// imported inputs and may be the same set.  Operations resolve
    /// against the first UTXO they consume.
    pub fn resolve_signers(
        &mut self,
        utxos: &UtxoSet<Output>,
        imported: &UtxoSet<Output>,
    ) -> Result<(), TransactionError> {
        self.base_mut().resolve_signers(utxos)?;
        match self {
            Transaction::Import(tx) => {
                resolve_input_signers(&mut tx.imported_inputs, imported)?;
            }
            Transaction::Operation(tx) => {
                for op in &mut tx.operations {
                    let Some(utxo) = op.utxo_ids.first().and_then(|id| utxos.get(id)) else {
                        continue;
                    };
                    let addresses = utxo.owners().addresses();
                    for sig in op.operation.sig_indices_mut() {
                        let address = addresses
                            .get(sig.index as usize)
                            .ok_or(TransactionError::UnresolvedSigIdx { index: sig.index })?;
                        sig.source = Some(*address);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl Variant for Transaction {
    const DOMAIN: Domain = Domain::Transaction;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        match type_id {
            type_ids::BASE_TX => Ok(Transaction::Base(BaseTx::default())),
            type_ids::CREATE_ASSET_TX => Ok(Transaction::CreateAsset(CreateAssetTx::default())),
            type_ids::OPERATION_TX => Ok(Transaction::Operation(OperationTx::default())),
            type_ids::IMPORT_TX => Ok(Transaction::Import(ImportTx::default())),
            type_ids::EXPORT_TX => Ok(Transaction::Export(ExportTx::default())),
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        match self {
            Transaction::Base(_) => type_ids::BASE_TX,
            Transaction::CreateAsset(_) => type_ids::CREATE_ASSET_TX,
            Transaction::Operation(_) => type_ids::OPERATION_TX,
            Transaction::Import(_) => type_ids::IMPORT_TX,
            Transaction::Export(_) => type_ids::EXPORT_TX,
        }
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        match self {
            Transaction::Base(tx) => tx.write_to(writer, codec),
            Transaction::CreateAsset(tx) => tx.write_to(writer, codec),
            Transaction::Operation(tx) => tx.write_to(writer, codec),
            Transaction::Import(tx) => tx.write_to(writer, codec),
            Transaction::Export(tx) => tx.write_to(writer, codec),
        }
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        match self {
            Transaction::Base(tx) => *tx = BaseTx::read_from(reader, codec)?,
            Transaction::CreateAsset(tx) => *tx = CreateAssetTx::read_from(reader, codec)?,
            Transaction::Operation(tx) => *tx = OperationTx::read_from(reader, codec)?,
            Transaction::Import(tx) => *tx = ImportTx::read_from(reader, codec)?,
            Transaction::Export(tx) => *tx = ExportTx::read_from(reader, codec)?,
        }
        Ok(())
    }
}
