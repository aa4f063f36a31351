//! Wire type IDs of the platform chain.
//!
//! Both platform codecs share one table; codec 1 only adds fields to some
//! Camino transactions.

use camino_transaction::Codec;

pub const SECP_TRANSFER_INPUT: u32 = 5;
pub const SECP_TRANSFER_OUTPUT: u32 = 7;
pub const SECP_CREDENTIAL: u32 = 9;
pub const SUBNET_AUTH: u32 = 10;
pub const SECP_OWNER_OUTPUT: u32 = 11;

pub const ADD_VALIDATOR_TX: u32 = 12;
pub const ADD_SUBNET_VALIDATOR_TX: u32 = 13;
pub const ADD_DELEGATOR_TX: u32 = 14;
pub const CREATE_CHAIN_TX: u32 = 15;
pub const CREATE_SUBNET_TX: u32 = 16;
pub const IMPORT_TX: u32 = 17;
pub const EXPORT_TX: u32 = 18;

pub const STAKEABLE_LOCK_IN: u32 = 21;
pub const STAKEABLE_LOCK_OUT: u32 = 22;
pub const REMOVE_SUBNET_VALIDATOR_TX: u32 = 23;

// Camino extensions.
pub const LOCKED_IN: u32 = 8192;
pub const LOCKED_OUT: u32 = 8193;
pub const CAMINO_ADD_VALIDATOR_TX: u32 = 8194;
pub const ADDRESS_STATE_TX: u32 = 8196;
pub const DEPOSIT_TX: u32 = 8197;
pub const UNLOCK_DEPOSIT_TX: u32 = 8198;
pub const CLAIM_TX: u32 = 8199;
pub const REGISTER_NODE_TX: u32 = 8200;
pub const BASE_TX: u32 = 8202;
pub const MULTISIG_ALIAS_TX: u32 = 8203;
pub const MULTISIG_CREDENTIAL: u32 = 8204;

/// Codecs this chain can encode.
pub fn supported(codec: Codec) -> bool {
    codec == Codec::V0 || codec == Codec::V1
}

/// Whether `codec` carries the executor and creator authorizations.
pub fn has_creator_auth(codec: Codec) -> bool {
    codec == Codec::V1
}
