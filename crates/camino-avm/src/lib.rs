/// Camino SDK - asset chain (X-chain) transactions.
///
/// Output, input, credential and operation sum types for both asset chain
/// codecs, the five transaction kinds, and a builder that plans spends
/// against a UTXO snapshot.

pub mod builder;
pub mod inputs;
pub mod operations;
pub mod outputs;
pub mod txs;
pub mod type_ids;
pub mod unsigned;

pub use builder::TxBuilder;
pub use inputs::{Credential, Input};
pub use operations::{NftMintOperation, NftTransferOperation, Operation, SecpMintOperation, TransferableOperation};
pub use outputs::{NftMintOutput, NftTransferOutput, Output, SecpMintOutput};
pub use txs::{BaseTx, CreateAssetTx, ExportTx, ImportTx, InitialState, OperationTx, Transaction};
pub use unsigned::{Tx, UnsignedTx};
