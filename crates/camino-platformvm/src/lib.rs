/// Camino SDK - platform chain (P-chain) transactions.
///
/// Output, input, credential and authorization sum types; stakeable-lock
/// and deposit/bond locked variants; staking, subnet, atomic and Camino
/// transactions; the delegation fee type; and a builder that plans spends
/// in every lock mode against a UTXO snapshot.

pub mod auth;
pub mod builder;
pub mod delegation_fee;
pub mod inputs;
pub mod outputs;
pub mod txs;
pub mod type_ids;
pub mod unsigned;

pub use auth::Authorization;
pub use builder::{ClaimRequest, TxBuilder};
pub use delegation_fee::DelegationFee;
pub use inputs::{Credential, Input, LockedIn, StakeableLockIn};
pub use outputs::{LockedOut, Output, StakeableLockOut};
pub use txs::{
    address_state, AddDelegatorTx, AddSubnetValidatorTx, AddValidatorTx, AddressStateTx, BaseTx,
    CaminoAddValidatorTx, ClaimTx, ClaimType, Claimable, CreateChainTx, CreateSubnetTx, DepositTx, ExportTx,
    ImportTx, MultisigAlias, MultisigAliasTx, PlatformTx, RegisterNodeTx, RemoveSubnetValidatorTx,
    SubnetValidator, Transaction, UnlockDepositTx, Validator,
};
pub use unsigned::{Tx, UnsignedTx};
