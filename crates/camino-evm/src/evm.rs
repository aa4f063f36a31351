//! Account-side entries of atomic transactions.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::Id;
use camino_transaction::codec::{Codec, Encodable, ReadExt};
use camino_transaction::TransactionError;

use crate::address::EthAddress;

/// Encoded size of one [`EvmOutput`].
pub const EVM_OUTPUT_SIZE: usize = 20 + 8 + 32;

/// Encoded size of one [`EvmInput`].
pub const EVM_INPUT_SIZE: usize = 20 + 8 + 32 + 8;

/// Credit to an account.
///
/// Body: `address 20 | amount u64 | asset ID 32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvmOutput {
    pub address: EthAddress,
    pub amount: u64,
    pub asset_id: Id,
}

impl EvmOutput {
    pub fn new(address: EthAddress, amount: u64, asset_id: Id) -> Self {
        EvmOutput {
            address,
            amount,
            asset_id,
        }
    }
}

impl Encodable for EvmOutput {
    fn write_to(&self, writer: &mut ByteWriter, _codec: Codec) {
        writer.write_bytes(self.address.as_bytes());
        writer.write_u64_be(self.amount);
        writer.write_bytes(self.asset_id.as_bytes());
    }

    fn read_from(reader: &mut ByteReader<'_>, _codec: Codec) -> Result<Self, TransactionError> {
        Ok(EvmOutput {
            address: EthAddress::new(reader.read_array().reading("evm output address")?),
            amount: reader.read_u64_be().reading("evm output amount")?,
            asset_id: Id::new(reader.read_array().reading("evm output asset")?),
        })
    }
}

/// Debit from an account at a given nonce.  Signed by the key of
/// `address`.
///
/// Body: `address 20 | amount u64 | asset ID 32 | nonce u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvmInput {
    pub address: EthAddress,
    pub amount: u64,
    pub asset_id: Id,
    pub nonce: u64,
}

impl EvmInput {
    pub fn new(address: EthAddress, amount: u64, asset_id: Id, nonce: u64) -> Self {
        EvmInput {
            address,
            amount,
            asset_id,
            nonce,
        }
    }
}

impl Encodable for EvmInput {
    fn write_to(&self, writer: &mut ByteWriter, _codec: Codec) {
        writer.write_bytes(self.address.as_bytes());
        writer.write_u64_be(self.amount);
        writer.write_bytes(self.asset_id.as_bytes());
        writer.write_u64_be(self.nonce);
    }

    fn read_from(reader: &mut ByteReader<'_>, _codec: Codec) -> Result<Self, TransactionError> {
        Ok(EvmInput {
            address: EthAddress::new(reader.read_array().reading("evm input address")?),
            amount: reader.read_u64_be().reading("evm input amount")?,
            asset_id: Id::new(reader.read_array().reading("evm input asset")?),
            nonce: reader.read_u64_be().reading("evm input nonce")?,
        })
    }
}

/// Sort by (address, asset ID).
pub fn sort_evm_outputs(outputs: &mut [EvmOutput]) {
    outputs.sort_by(|a, b| (a.address, a.asset_id).cmp(&(b.address, b.asset_id)));
}

/// Sort by (address, asset ID).
pub fn sort_evm_inputs(inputs: &mut [EvmInput]) {
    inputs.sort_by(|a, b| (a.address, a.asset_id).cmp(&(b.address, b.asset_id)));
}

/// Whether no two inputs debit the same (address, asset) and they are in
/// canonical order.
pub fn evm_inputs_sorted_unique(inputs: &[EvmInput]) -> bool {
    inputs
        .windows(2)
        .all(|w| (w[0].address, w[0].asset_id) < (w[1].address, w[1].asset_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> EthAddress {
        EthAddress::new([b; 20])
    }

    #[test]
    fn test_input_layout() {
        let input = EvmInput::new(addr(0xab), 1_000, Id::new([0xcd; 32]), 7);
        let bytes = input.to_bytes(Codec::V0);
        assert_eq!(bytes.len(), EVM_INPUT_SIZE);
        assert_eq!(&bytes[20..28], &1_000u64.to_be_bytes());
        assert_eq!(&bytes[60..], &7u64.to_be_bytes());
        assert_eq!(EvmInput::from_bytes(&bytes, Codec::V0).unwrap(), input);
    }

    #[test]
    fn test_sort_by_address_then_asset() {
        let mut outputs = vec![
            EvmOutput::new(addr(2), 1, Id::new([1; 32])),
            EvmOutput::new(addr(1), 1, Id::new([9; 32])),
            EvmOutput::new(addr(1), 1, Id::new([3; 32])),
        ];
        sort_evm_outputs(&mut outputs);
        let keys: Vec<(u8, u8)> = outputs.iter().map(|o| (o.address.as_bytes()[0], o.asset_id.as_bytes()[0])).collect();
        assert_eq!(keys, vec![(1, 3), (1, 9), (2, 1)]);

        let dup = [
            EvmInput::new(addr(1), 1, Id::ZERO, 0),
            EvmInput::new(addr(1), 2, Id::ZERO, 1),
        ];
        assert!(!evm_inputs_sorted_unique(&dup));
    }
}
