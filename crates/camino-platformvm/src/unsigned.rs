//! The codec-framed unsigned transaction.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_transaction::codec::{Codec, Variant};
use camino_transaction::{CredentialRequirement, SignedTx, TransactionError, UnsignedTransaction, UtxoSet};

use crate::inputs::Credential;
use crate::outputs::Output;
use crate::txs::Transaction;
use crate::type_ids;

/// A platform transaction with the codec it is encoded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    pub codec: Codec,
    pub tx: Transaction,
}

/// A signed platform chain transaction.
pub type Tx = SignedTx<UnsignedTx>;

impl UnsignedTx {
    pub fn new(codec: Codec, tx: Transaction) -> Self {
        UnsignedTx { codec, tx }
    }

    /// See [`Transaction::resolve_signers`].
    pub fn resolve_signers(
        &mut self,
        utxos: &UtxoSet<Output>,
        imported: &UtxoSet<Output>,
    ) -> Result<usize, TransactionError> {
        self.tx.resolve_signers(utxos, imported)
    }
}

impl UnsignedTransaction for UnsignedTx {
    type Credential = Credential;

    fn codec(&self) -> Codec {
        self.codec
    }

    fn write_tx(&self, writer: &mut ByteWriter) {
        self.codec.write_to(writer);
        self.tx.write_typed(writer, self.codec);
    }

    fn read_tx(reader: &mut ByteReader<'_>) -> Result<Self, TransactionError> {
        let start = reader.offset();
        let codec = Codec::read_from(reader)?;
        if !type_ids::supported(codec) {
            return Err(TransactionError::malformed(format!("unsupported {}", codec), start));
        }
        let tx = Transaction::read_typed(reader, codec)?;
        Ok(UnsignedTx { codec, tx })
    }

    fn credential_requirements(&self) -> Vec<CredentialRequirement<Credential>> {
        self.tx.credential_requirements(self.codec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::txs::{BaseTx, UnlockDepositTx};
    use camino_primitives::Id;

    #[test]
    fn test_unlock_deposit_framing() {
        let unsigned = UnsignedTx::new(
            Codec::V0,
            Transaction::UnlockDeposit(UnlockDepositTx {
                base: BaseTx::new(1000, Id::ZERO),
            }),
        );
        let bytes = unsigned.unsigned_bytes();
        assert_eq!(hex::encode(&bytes[..6]), "000000002006");
        assert_eq!(UnsignedTx::from_unsigned_bytes(&bytes).unwrap(), unsigned);
    }

    #[test]
    fn test_rejects_unknown_codec() {
        let mut bytes = UnsignedTx::new(Codec::V0, Transaction::Base(BaseTx::default())).unsigned_bytes();
        bytes[1] = 7;
        assert!(matches!(
            UnsignedTx::from_unsigned_bytes(&bytes),
            Err(TransactionError::Malformed { .. })
        ));
    }
}
