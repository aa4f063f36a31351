//! The codec-framed unsigned transaction.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_transaction::codec::{Codec, Variant};
use camino_transaction::{CredentialRequirement, SignedTx, TransactionError, UnsignedTransaction};

use crate::inputs::Credential;
use crate::txs::Transaction;
use crate::type_ids;

/// A transaction with the codec it is encoded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    pub codec: Codec,
    pub tx: Transaction,
}

/// A signed asset chain transaction.
pub type Tx = SignedTx<UnsignedTx>;

impl UnsignedTx {
    pub fn new(codec: Codec, tx: Transaction) -> Self {
        UnsignedTx { codec, tx }
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
        self.tx.credential_requirements()
    }
}
