//! Atomic transactions between the EVM chain and the UTXO chains.
//!
//! Neither carries a base transaction or memo: the body starts with the
//! network and chain IDs and goes straight to the transfer lists.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::Id;
use camino_transaction::codec::{read_list, write_list, Codec, Domain, Encodable, ReadExt, Variant};
use camino_transaction::secp::SecpCredential;
use camino_transaction::transferable::{
    resolve_input_signers, sort_inputs, sort_outputs, TRANSFERABLE_INPUT_MIN_SIZE, TRANSFERABLE_OUTPUT_MIN_SIZE,
};
use camino_transaction::{
    CredentialRequirement, InputVariant, OutputVariant, SigIdx, TransactionError, TransferableInput,
    TransferableOutput, UtxoSet,
};

use crate::entities::{Credential, Input, Output};
use crate::evm::{sort_evm_inputs, sort_evm_outputs, EvmInput, EvmOutput, EVM_INPUT_SIZE, EVM_OUTPUT_SIZE};
use crate::type_ids;

fn total(mut amounts: impl Iterator<Item = u64>) -> Result<u64, TransactionError> {
    amounts.try_fold(0u64, |acc, amount| {
        acc.checked_add(amount)
            .ok_or_else(|| TransactionError::AmountOutOfRange(format!("{} + {} overflows", acc, amount)))
    })
}

/// Move UTXOs exported by another chain into EVM accounts.
///
/// Body: `network ID u32 | chain ID 32 | source chain 32 |
/// num inputs | transferable inputs... | num outputs | evm outputs...`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub source_chain: Id,
    pub imported_inputs: Vec<TransferableInput<Input>>,
    pub outputs: Vec<EvmOutput>,
}

impl ImportTx {
    /// Inputs and outputs are sorted canonically.
    pub fn new(
        network_id: u32,
        blockchain_id: Id,
        source_chain: Id,
        mut imported_inputs: Vec<TransferableInput<Input>>,
        mut outputs: Vec<EvmOutput>,
    ) -> Self {
        sort_inputs(&mut imported_inputs);
        sort_evm_outputs(&mut outputs);
        ImportTx {
            network_id,
            blockchain_id,
            source_chain,
            imported_inputs,
            outputs,
        }
    }

    /// Imported value of `asset_id` not credited to any account.
    pub fn burned(&self, asset_id: Id) -> Result<u64, TransactionError> {
        let consumed = total(
            self.imported_inputs
                .iter()
                .filter(|i| i.asset_id == asset_id)
                .map(|i| i.input.amount()),
        )?;
        let credited = total(self.outputs.iter().filter(|o| o.asset_id == asset_id).map(|o| o.amount))?;
        Ok(consumed.saturating_sub(credited))
    }
}

impl Encodable for ImportTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_u32_be(self.network_id);
        writer.write_bytes(self.blockchain_id.as_bytes());
        writer.write_bytes(self.source_chain.as_bytes());
        write_list(writer, &self.imported_inputs, codec);
        write_list(writer, &self.outputs, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(ImportTx {
            network_id: reader.read_u32_be().reading("network id")?,
            blockchain_id: Id::new(reader.read_array().reading("blockchain id")?),
            source_chain: Id::new(reader.read_array().reading("source chain")?),
            imported_inputs: read_list(reader, codec, TRANSFERABLE_INPUT_MIN_SIZE)?,
            outputs: read_list(reader, codec, EVM_OUTPUT_SIZE)?,
        })
    }
}

/// Move value out of EVM accounts into another chain's shared memory.
///
/// Body: `network ID u32 | chain ID 32 | destination chain 32 |
/// num inputs | evm inputs... | num outputs | transferable outputs...`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub destination_chain: Id,
    pub inputs: Vec<EvmInput>,
    pub exported_outputs: Vec<TransferableOutput<Output>>,
}

impl ExportTx {
    /// Inputs and outputs are sorted canonically.
    pub fn new(
        network_id: u32,
        blockchain_id: Id,
        destination_chain: Id,
        mut inputs: Vec<EvmInput>,
        mut exported_outputs: Vec<TransferableOutput<Output>>,
    ) -> Self {
        sort_evm_inputs(&mut inputs);
        sort_outputs(&mut exported_outputs, Codec::V0);
        ExportTx {
            network_id,
            blockchain_id,
            destination_chain,
            inputs,
            exported_outputs,
        }
    }

    /// Debited value of `asset_id` not exported.
    pub fn burned(&self, asset_id: Id) -> Result<u64, TransactionError> {
        let debited = total(self.inputs.iter().filter(|i| i.asset_id == asset_id).map(|i| i.amount))?;
        let exported = total(
            self.exported_outputs
                .iter()
                .filter(|o| o.asset_id == asset_id)
                .map(|o| o.output.amount()),
        )?;
        Ok(debited.saturating_sub(exported))
    }
}

impl Encodable for ExportTx {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_u32_be(self.network_id);
        writer.write_bytes(self.blockchain_id.as_bytes());
        writer.write_bytes(self.destination_chain.as_bytes());
        write_list(writer, &self.inputs, codec);
        write_list(writer, &self.exported_outputs, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        Ok(ExportTx {
            network_id: reader.read_u32_be().reading("network id")?,
            blockchain_id: Id::new(reader.read_array().reading("blockchain id")?),
            destination_chain: Id::new(reader.read_array().reading("destination chain")?),
            inputs: read_list(reader, codec, EVM_INPUT_SIZE)?,
            exported_outputs: read_list(reader, codec, TRANSFERABLE_OUTPUT_MIN_SIZE)?,
        })
    }
}

/// Every atomic transaction the EVM chain knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Import(ImportTx),
    Export(ExportTx),
}

impl Transaction {
    /// One credential per imported input, or one single-signature
    /// credential per debited account.
    pub fn credential_requirements(&self) -> Vec<CredentialRequirement<Credential>> {
        match self {
            Transaction::Import(tx) => tx
                .imported_inputs
                .iter()
                .map(|i| CredentialRequirement::new(i.input.credential(), i.input.sig_indices().to_vec()))
                .collect(),
            Transaction::Export(tx) => tx
                .inputs
                .iter()
                .map(|i| {
                    CredentialRequirement::new(
                        Credential::Secp(SecpCredential::default()),
                        vec![SigIdx::with_source(0, i.address.to_short_id())],
                    )
                })
                .collect(),
        }
    }

    /// Attach signing addresses to decoded import inputs.
    pub fn resolve_signers(&mut self, imported: &UtxoSet<Output>) -> Result<usize, TransactionError> {
        match self {
            Transaction::Import(tx) => resolve_input_signers(&mut tx.imported_inputs, imported),
            Transaction::Export(_) => Ok(0),
        }
    }
}

impl Variant for Transaction {
    const DOMAIN: Domain = Domain::Transaction;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        match type_id {
            type_ids::IMPORT_TX => Ok(Transaction::Import(ImportTx::default())),
            type_ids::EXPORT_TX => Ok(Transaction::Export(ExportTx::default())),
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        match self {
            Transaction::Import(_) => type_ids::IMPORT_TX,
            Transaction::Export(_) => type_ids::EXPORT_TX,
        }
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        match self {
            Transaction::Import(tx) => tx.write_to(writer, codec),
            Transaction::Export(tx) => tx.write_to(writer, codec),
        }
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        match self {
            Transaction::Import(tx) => *tx = ImportTx::read_from(reader, codec)?,
            Transaction::Export(tx) => *tx = ExportTx::read_from(reader, codec)?,
        }
        Ok(())
    }
}
