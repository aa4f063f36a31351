//! Wire type IDs of the asset chain.
//!
//! Codec 0 numbers every type in one flat sequence.  Codec 1 gives each
//! feature extension its own range: SECP at `1 << 16`, NFT at `2 << 16`.

use camino_transaction::Codec;

pub const SECP_FX_ID: u32 = 0;
pub const NFT_FX_ID: u32 = 1;

// Transactions (identical under both codecs).
pub const BASE_TX: u32 = 0;
pub const CREATE_ASSET_TX: u32 = 1;
pub const OPERATION_TX: u32 = 2;
pub const IMPORT_TX: u32 = 3;
pub const EXPORT_TX: u32 = 4;

// Codec 0.
pub const SECP_TRANSFER_INPUT: u32 = 5;
pub const SECP_MINT_OUTPUT: u32 = 6;
pub const SECP_TRANSFER_OUTPUT: u32 = 7;
pub const SECP_MINT_OPERATION: u32 = 8;
pub const SECP_CREDENTIAL: u32 = 9;
pub const NFT_MINT_OUTPUT: u32 = 10;
pub const NFT_TRANSFER_OUTPUT: u32 = 11;
pub const NFT_MINT_OPERATION: u32 = 12;
pub const NFT_TRANSFER_OPERATION: u32 = 13;
pub const NFT_CREDENTIAL: u32 = 14;

// Codec 1.
pub const V1_SECP_TRANSFER_INPUT: u32 = 65536;
pub const V1_SECP_MINT_OUTPUT: u32 = 65537;
pub const V1_SECP_TRANSFER_OUTPUT: u32 = 65538;
pub const V1_SECP_MINT_OPERATION: u32 = 65539;
pub const V1_SECP_CREDENTIAL: u32 = 65540;
pub const V1_NFT_MINT_OUTPUT: u32 = 131072;
pub const V1_NFT_TRANSFER_OUTPUT: u32 = 131073;
pub const V1_NFT_MINT_OPERATION: u32 = 131074;
pub const V1_NFT_TRANSFER_OPERATION: u32 = 131075;
pub const V1_NFT_CREDENTIAL: u32 = 131076;

/// Whether `codec` uses the per-extension ranges.
pub fn extended(codec: Codec) -> bool {
    codec == Codec::V1
}

/// Codecs this chain can encode.
pub fn supported(codec: Codec) -> bool {
    codec == Codec::V0 || codec == Codec::V1
}
