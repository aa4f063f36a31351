//! secp256k1 outputs, inputs and credentials shared by every chain.
//!
//! These are the fixed shapes; each chain wraps them in its own sum types
//! and assigns type IDs.

use std::hash::{Hash, Hasher};

use camino_primitives::ec::signature::SIGNATURE_LEN;
use camino_primitives::ec::Signature;
use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::ShortId;

use crate::codec::{Codec, Encodable, ReadExt};
use crate::entity::InputVariant;
use crate::lock::LockState;
use crate::owners::{OutputOwners, OWNERS_MIN_SIZE};
use crate::TransactionError;

// ---------------------------------------------------------------------------
// Signature indices
// ---------------------------------------------------------------------------

/// Position of a required signer in the owner set being spent.
///
/// Only `index` is serialized.  `source` is the address at that position,
/// recorded locally when the input is planned so the signer can look the
/// key up without the UTXO; decoded inputs have no source.
///
/// Equality and hashing look at `index` only, so a decoded input equals
/// the planned one it was encoded from.
#[derive(Debug, Clone, Copy)]
pub struct SigIdx {
    pub index: u32,
    pub source: Option<ShortId>,
}

impl PartialEq for SigIdx {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for SigIdx {}

impl Hash for SigIdx {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl SigIdx {
    pub fn new(index: u32) -> Self {
        SigIdx {
            index,
            source: None,
        }
    }

    pub fn with_source(index: u32, source: ShortId) -> Self {
        SigIdx {
            index,
            source: Some(source),
        }
    }
}

/// Accumulates signature indices before producing an immutable input.
#[derive(Debug, Clone, Default)]
pub struct InputBuilder {
    amount: u64,
    sig_indices: Vec<SigIdx>,
    lock: LockState,
}

impl InputBuilder {
    pub fn new(amount: u64) -> Self {
        InputBuilder {
            amount,
            ..Default::default()
        }
    }

    /// Spend an output held in `lock`.
    pub fn lock(mut self, lock: LockState) -> Self {
        self.lock = lock;
        self
    }

    /// Add a signer, keeping indices ascending and unique.
    ///
    /// Re-adding an index replaces its source.
    pub fn add_signature_index(&mut self, index: u32, source: ShortId) -> &mut Self {
        let sig = SigIdx::with_source(index, source);
        match self.sig_indices.binary_search_by_key(&index, |s| s.index) {
            Ok(pos) => self.sig_indices[pos] = sig,
            Err(pos) => self.sig_indices.insert(pos, sig),
        }
        self
    }

    pub fn sig_indices(&self) -> &[SigIdx] {
        &self.sig_indices
    }

    /// Produce the chain's input variant for the recorded lock state.
    pub fn build<I: InputVariant>(self) -> Result<I, TransactionError> {
        I::spending(self.amount, self.sig_indices, &self.lock)
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// An amount locked to an owner set.
///
/// # Wire format
///
/// | Field   | Size               |
/// |---------|--------------------|
/// | amount  | 8 bytes (BE)       |
/// | owners  | see `OutputOwners` |
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecpTransferOutput {
    pub amount: u64,
    pub owners: OutputOwners,
}

/// Encoded size of a transfer output with no addresses.
pub const TRANSFER_OUTPUT_MIN_SIZE: usize = 8 + OWNERS_MIN_SIZE;

impl SecpTransferOutput {
    pub fn new(amount: u64, owners: OutputOwners) -> Self {
        SecpTransferOutput { amount, owners }
    }
}

impl Encodable for SecpTransferOutput {
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_u64_be(self.amount);
        self.owners.write_to(writer, codec);
    }

    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let amount = reader.read_u64_be().reading("output amount")?;
        let owners = OutputOwners::read_from(reader, codec)?;
        Ok(SecpTransferOutput { amount, owners })
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Spends an amount using the signers at `sig_indices`.
///
/// # Wire format
///
/// | Field        | Size            |
/// |--------------|-----------------|
/// | amount       | 8 bytes (BE)    |
/// | num indices  | 4 bytes (BE)    |
/// | indices      | 4 bytes each    |
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecpTransferInput {
    pub amount: u64,
    pub sig_indices: Vec<SigIdx>,
}

/// Encoded size of a transfer input with no signers.
pub const TRANSFER_INPUT_MIN_SIZE: usize = 8 + 4;

impl SecpTransferInput {
    pub fn new(amount: u64, sig_indices: Vec<SigIdx>) -> Self {
        SecpTransferInput {
            amount,
            sig_indices,
        }
    }
}

pub(crate) fn write_sig_indices(writer: &mut ByteWriter, sig_indices: &[SigIdx]) {
    writer.write_length_prefixed_array(sig_indices, |w, s| w.write_u32_be(s.index));
}

pub(crate) fn read_sig_indices(reader: &mut ByteReader<'_>) -> Result<Vec<SigIdx>, TransactionError> {
    reader.read_length_prefixed_array(4, |r| {
        Ok::<_, TransactionError>(SigIdx::new(r.read_u32_be().reading("signature index")?))
    })
}

impl Encodable for SecpTransferInput {
    fn write_to(&self, writer: &mut ByteWriter, _codec: Codec) {
        writer.write_u64_be(self.amount);
        write_sig_indices(writer, &self.sig_indices);
    }

    fn read_from(reader: &mut ByteReader<'_>, _codec: Codec) -> Result<Self, TransactionError> {
        let amount = reader.read_u64_be().reading("input amount")?;
        let sig_indices = read_sig_indices(reader)?;
        Ok(SecpTransferInput {
            amount,
            sig_indices,
        })
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

fn write_signatures(writer: &mut ByteWriter, signatures: &[Signature]) {
    writer.write_length_prefixed_array(signatures, |w, s| w.write_bytes(s.as_bytes()));
}

fn read_signatures(reader: &mut ByteReader<'_>) -> Result<Vec<Signature>, TransactionError> {
    reader.read_length_prefixed_array(SIGNATURE_LEN, |r| {
        Ok::<_, TransactionError>(Signature::new(r.read_array().reading("signature")?))
    })
}

/// Signatures in the order of the matching input's signature indices.
///
/// # Wire format
///
/// | Field      | Size            |
/// |------------|-----------------|
/// | num sigs   | 4 bytes (BE)    |
/// | signatures | 65 bytes each   |
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecpCredential {
    pub signatures: Vec<Signature>,
}

impl Encodable for SecpCredential {
    fn write_to(&self, writer: &mut ByteWriter, _codec: Codec) {
        write_signatures(writer, &self.signatures);
    }

    fn read_from(reader: &mut ByteReader<'_>, _codec: Codec) -> Result<Self, TransactionError> {
        Ok(SecpCredential {
            signatures: read_signatures(reader)?,
        })
    }
}

/// A signer inside a multisig credential: position `index` within the
/// owner set that `source` belongs to (an alias's owners, or the spent
/// output's owners for a plain address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MultisigSigIdx {
    pub index: u32,
    pub source: ShortId,
}

/// Signatures for inputs whose owners include multisig aliases.
///
/// # Wire format
///
/// | Field        | Size                         |
/// |--------------|------------------------------|
/// | num indices  | 4 bytes (BE)                 |
/// | indices      | 4-byte index + 20-byte source|
/// | num sigs     | 4 bytes (BE)                 |
/// | signatures   | 65 bytes each                |
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultisigCredential {
    pub sig_idxs: Vec<MultisigSigIdx>,
    pub signatures: Vec<Signature>,
}

impl MultisigCredential {
    /// Append a signer and its signature together.
    pub fn push(&mut self, signer: MultisigSigIdx, signature: Signature) {
        self.sig_idxs.push(signer);
        self.signatures.push(signature);
    }
}

impl Encodable for MultisigCredential {
    fn write_to(&self, writer: &mut ByteWriter, _codec: Codec) {
        writer.write_length_prefixed_array(&self.sig_idxs, |w, s| {
            w.write_u32_be(s.index);
            w.write_bytes(s.source.as_bytes());
        });
        write_signatures(writer, &self.signatures);
    }

    fn read_from(reader: &mut ByteReader<'_>, _codec: Codec) -> Result<Self, TransactionError> {
        let sig_idxs = reader.read_length_prefixed_array(24, |r| {
            let index = r.read_u32_be().reading("multisig index")?;
            let source = ShortId::new(r.read_array().reading("multisig source")?);
            Ok::<_, TransactionError>(MultisigSigIdx { index, source })
        })?;
        let signatures = read_signatures(reader)?;
        Ok(MultisigCredential {
            sig_idxs,
            signatures,
        })
    }
}
