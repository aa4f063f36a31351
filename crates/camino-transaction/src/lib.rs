/// Camino SDK - chain-independent transaction model, coin selection and signing.
///
/// Provides the codec context and type-dispatch contract, the shared
/// SECP entities, UTXOs and UTXO sets, the spend engine, key chains and
/// the signing engine.  Chain crates plug their sum types in through the
/// traits in `codec`, `entity` and `sign`.

pub mod auth;
pub mod base_tx;
pub mod codec;
pub mod entity;
pub mod keychain;
pub mod lock;
pub mod multisig;
pub mod network;
pub mod owners;
pub mod secp;
pub mod sign;
pub mod spend;
pub mod transferable;
pub mod utxo;
pub mod utxo_set;

mod error;
pub use error::{ErrorKind, TransactionError};

pub use auth::SubnetAuth;
pub use base_tx::BaseTx;
pub use codec::{Codec, Domain, Encodable, Variant};
pub use entity::{CredentialVariant, InputVariant, OutputVariant};
pub use keychain::{KeyChain, KeyPair};
pub use lock::{LockMode, LockState, LockedIds};
pub use multisig::{AliasMap, MultisigKeyChain, MultisigResolver};
pub use owners::OutputOwners;
pub use secp::{InputBuilder, SigIdx};
pub use sign::{sign, sign_partial, CredentialRequirement, KeySource, SignedTx, UnsignedTransaction};
pub use spend::{AssetAmountDestination, Spend, Spender};
pub use transferable::{TransferableInput, TransferableOutput};
pub use utxo::{Utxo, UtxoId};
pub use utxo_set::UtxoSet;

#[cfg(test)]
mod tests;
