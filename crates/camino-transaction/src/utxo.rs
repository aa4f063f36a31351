//! Unspent transaction outputs.

use std::fmt;

use camino_primitives::cb58;
use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::Id;

use crate::codec::{expect_end, Codec, ReadExt};
use crate::entity::OutputVariant;
use crate::lock::LockState;
use crate::owners::OutputOwners;
use crate::TransactionError;

/// Identity of a UTXO: the transaction that created it and the output's
/// position in that transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtxoId {
    pub tx_id: Id,
    pub output_index: u32,
}

impl UtxoId {
    pub fn new(tx_id: Id, output_index: u32) -> Self {
        UtxoId {
            tx_id,
            output_index,
        }
    }
}

impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.output_index)
    }
}

/// An output available to spend.
///
/// # Wire format
///
/// | Field        | Size           |
/// |--------------|----------------|
/// | codec ID     | 2 bytes (BE)   |
/// | tx ID        | 32 bytes       |
/// | output index | 4 bytes (BE)   |
/// | asset ID     | 32 bytes       |
/// | type ID      | 4 bytes (BE)   |
/// | output       | variant body   |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo<O> {
    pub codec: Codec,
    pub tx_id: Id,
    pub output_index: u32,
    pub asset_id: Id,
    pub output: O,
}

impl<O: OutputVariant> Utxo<O> {
    pub fn new(codec: Codec, tx_id: Id, output_index: u32, asset_id: Id, output: O) -> Self {
        Utxo {
            codec,
            tx_id,
            output_index,
            asset_id,
            output,
        }
    }

    pub fn id(&self) -> UtxoId {
        UtxoId::new(self.tx_id, self.output_index)
    }

    pub fn amount(&self) -> u64 {
        self.output.amount()
    }

    pub fn owners(&self) -> &OutputOwners {
        self.output.owners()
    }

    pub fn lock_state(&self) -> LockState {
        self.output.lock_state()
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        self.codec.write_to(writer);
        writer.write_bytes(self.tx_id.as_bytes());
        writer.write_u32_be(self.output_index);
        writer.write_bytes(self.asset_id.as_bytes());
        self.output.write_typed(writer, self.codec);
    }

    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, TransactionError> {
        let codec = Codec::read_from(reader)?;
        let tx_id = Id::new(reader.read_array().reading("utxo tx id")?);
        let output_index = reader.read_u32_be().reading("utxo output index")?;
        let asset_id = Id::new(reader.read_array().reading("utxo asset id")?);
        let output = O::read_typed(reader, codec)?;
        Ok(Utxo {
            codec,
            tx_id,
            output_index,
            asset_id,
            output,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let utxo = Self::read_from(&mut reader)?;
        expect_end(&reader, "utxo")?;
        Ok(utxo)
    }

    /// Parse the checksummed hex form returned by nodes.
    pub fn from_hex(s: &str) -> Result<Self, TransactionError> {
        Self::from_bytes(&cb58::check_decode_hex(s)?)
    }

    /// Parse the CB58 form.
    pub fn from_cb58(s: &str) -> Result<Self, TransactionError> {
        Self::from_bytes(&cb58::check_decode(s)?)
    }

    pub fn to_hex(&self) -> String {
        cb58::check_encode_hex(&self.to_bytes())
    }

    pub fn to_cb58(&self) -> String {
        cb58::check_encode(&self.to_bytes())
    }
}
