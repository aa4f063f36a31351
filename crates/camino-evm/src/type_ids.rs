//! Wire type IDs of the EVM chain's atomic codec.

use camino_transaction::Codec;

pub const IMPORT_TX: u32 = 0;
pub const EXPORT_TX: u32 = 1;

pub const SECP_TRANSFER_INPUT: u32 = 5;
pub const SECP_TRANSFER_OUTPUT: u32 = 7;
pub const SECP_CREDENTIAL: u32 = 9;

/// The atomic codec has a single version.
pub fn supported(codec: Codec) -> bool {
    codec == Codec::V0
}
