/// Camino SDK - EVM chain atomic transactions.
///
/// Import and export transactions that move value between EVM accounts
/// and the shared memory of the UTXO chains, EVM account addresses, a
/// key source that signs for them, gas accounting and builders.

pub mod address;
pub mod builder;
pub mod entities;
pub mod evm;
pub mod fee;
pub mod keychain;
pub mod txs;
pub mod type_ids;
pub mod unsigned;

pub use address::EthAddress;
pub use builder::TxBuilder;
pub use entities::{Credential, Input, Output};
pub use evm::{EvmInput, EvmOutput};
pub use keychain::EthKeyChain;
pub use txs::{ExportTx, ImportTx, Transaction};
pub use unsigned::{Tx, UnsignedTx};
