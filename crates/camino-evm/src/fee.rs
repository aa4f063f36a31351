//! Gas accounting for atomic transactions.
//!
//! Atomic transactions pay gas per signed byte and per signature on top
//! of a fixed base cost. The fee in native units is the gas times the EVM
//! base fee, converted from wei.

use camino_primitives::ec::signature::SIGNATURE_LEN;
use camino_transaction::{CredentialVariant, TransactionError, UnsignedTransaction};

use crate::unsigned::{Tx, UnsignedTx};

/// Gas per byte of the signed transaction.
pub const TX_BYTES_GAS: u64 = 1;

/// Gas per signature verified.
pub const COST_PER_SIGNATURE: u64 = 1_000;

/// Fixed gas charged to every atomic transaction.
pub const ATOMIC_TX_BASE_COST: u64 = 10_000;

/// Wei per native unit on the EVM side.
pub const X2C_RATE: u128 = 1_000_000_000;

/// Credential framing: type ID and signature count.
const CREDENTIAL_HEADER: u64 = 4 + 4;

fn overflow(what: &str) -> TransactionError {
    TransactionError::AmountOutOfRange(format!("{} overflows", what))
}

fn gas(bytes: u64, signatures: u64) -> Result<u64, TransactionError> {
    bytes
        .checked_mul(TX_BYTES_GAS)
        .zip(signatures.checked_mul(COST_PER_SIGNATURE))
        .and_then(|(b, s)| b.checked_add(s))
        .and_then(|g| g.checked_add(ATOMIC_TX_BASE_COST))
        .ok_or_else(|| overflow("gas"))
}

fn count(mut values: impl Iterator<Item = usize>) -> Result<u64, TransactionError> {
    values.try_fold(0u64, |acc, n| {
        u64::try_from(n)
            .ok()
            .and_then(|n| acc.checked_add(n))
            .ok_or_else(|| overflow("signature count"))
    })
}

/// Gas used by a signed transaction.
pub fn gas_used(tx: &Tx) -> Result<u64, TransactionError> {
    let signatures = count(tx.credentials.iter().map(|c| c.signatures().len()))?;
    let bytes = u64::try_from(tx.to_bytes().len()).map_err(|_| overflow("size"))?;
    gas(bytes, signatures)
}

/// Gas the transaction will use once every credential is filled.
///
/// The fee only changes amounts, never sizes, so an estimate taken with
/// any fee holds for the final transaction.
pub fn estimate_gas(unsigned: &UnsignedTx) -> Result<u64, TransactionError> {
    let requirements = unsigned.credential_requirements();
    let signatures = count(requirements.iter().map(|r| r.signers.len()))?;
    let credentials = count(std::iter::once(requirements.len()))?;
    let unsigned_len = count(std::iter::once(unsigned.unsigned_bytes().len()))?;
    let bytes = credentials
        .checked_mul(CREDENTIAL_HEADER)
        .zip(signatures.checked_mul(SIGNATURE_LEN as u64))
        .and_then(|(c, s)| c.checked_add(s))
        .and_then(|framing| framing.checked_add(unsigned_len))
        .and_then(|framing| framing.checked_add(4))
        .ok_or_else(|| overflow("size"))?;
    gas(bytes, signatures)
}

/// Native-unit fee for `gas` at `base_fee` wei per gas, rounded up.
pub fn fee_for_gas(gas: u64, base_fee: u128) -> Result<u64, TransactionError> {
    let wei = u128::from(gas)
        .checked_mul(base_fee)
        .ok_or_else(|| TransactionError::AmountOutOfRange(format!("{} gas at base fee {}", gas, base_fee)))?;
    u64::try_from(wei.div_ceil(X2C_RATE))
        .map_err(|_| TransactionError::AmountOutOfRange(format!("fee of {} wei", wei)))
}
