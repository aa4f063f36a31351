//! Signing engine and signed-transaction container.
//!
//! The signing digest is SHA-256 of the unsigned transaction bytes
//! (`codec ID | type ID | body`).  Each transaction lists the credentials it
//! needs, in wire order, as [`CredentialRequirement`]s: one per input, then
//! any authorization credentials, then any node-identity credential.  A
//! [`KeySource`] fills each requirement with signatures in `SigIdx` order.

use camino_primitives::cb58;
use camino_primitives::ec::signature::SIGNATURE_LEN;
use camino_primitives::ec::Signature;
use camino_primitives::hash::sha256;
use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::{Id, ShortId};
use tracing::{debug, warn};

use crate::codec::{expect_end, read_typed_list, write_typed_list, Codec};
use crate::entity::CredentialVariant;
use crate::keychain::KeyChain;
use crate::secp::SigIdx;
use crate::TransactionError;

/// The all-zero signature standing in for one that could not be made.
pub fn placeholder_signature() -> Signature {
    Signature::new([0u8; SIGNATURE_LEN])
}

/// Whether `signature` is the placeholder left by partial signing.
pub fn is_placeholder(signature: &Signature) -> bool {
    signature.as_bytes().iter().all(|b| *b == 0)
}

/// An empty credential and the signers that must fill it, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRequirement<C> {
    pub credential: C,
    pub signers: Vec<SigIdx>,
}

impl<C> CredentialRequirement<C> {
    pub fn new(credential: C, signers: Vec<SigIdx>) -> Self {
        CredentialRequirement {
            credential,
            signers,
        }
    }
}

/// An unsigned transaction of one chain.
pub trait UnsignedTransaction: Sized {
    /// The chain's credential sum type.
    type Credential: CredentialVariant;

    fn codec(&self) -> Codec;

    /// Append `codec ID | type ID | body`.
    fn write_tx(&self, writer: &mut ByteWriter);

    /// Decode `codec ID | type ID | body`.
    fn read_tx(reader: &mut ByteReader<'_>) -> Result<Self, TransactionError>;

    /// Credentials needed, in the order they appear on the wire.
    fn credential_requirements(&self) -> Vec<CredentialRequirement<Self::Credential>>;

    fn unsigned_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write_tx(&mut writer);
        writer.into_bytes()
    }

    fn from_unsigned_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_tx(&mut reader)?;
        expect_end(&reader, "unsigned transaction")?;
        Ok(tx)
    }

    /// SHA-256 of the unsigned bytes; the message every credential signs.
    fn hash(&self) -> [u8; 32] {
        sha256(&self.unsigned_bytes())
    }
}

/// A filled credential and the signature slots left as placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filled<C> {
    pub credential: C,
    /// `(signature position, address)` for each placeholder.
    pub missing: Vec<(usize, ShortId)>,
}

/// Produces signatures for credential requirements.
///
/// A missing key is not an error here: the slot gets a placeholder and is
/// reported in [`Filled::missing`], so partial signing works with any
/// source.  [`sign`] turns missing keys into `KeyNotFound`.
pub trait KeySource {
    fn fill<C: CredentialVariant>(
        &self,
        requirement: &CredentialRequirement<C>,
        digest: &[u8],
        codec: Codec,
    ) -> Result<Filled<C>, TransactionError>;

    /// Fill every requirement of one transaction.
    fn fill_all<C: CredentialVariant>(
        &self,
        requirements: &[CredentialRequirement<C>],
        digest: &[u8],
        codec: Codec,
    ) -> Result<Vec<Filled<C>>, TransactionError> {
        requirements
            .iter()
            .map(|r| self.fill(r, digest, codec))
            .collect()
    }
}

impl KeySource for KeyChain {
    fn fill<C: CredentialVariant>(
        &self,
        requirement: &CredentialRequirement<C>,
        digest: &[u8],
        _codec: Codec,
    ) -> Result<Filled<C>, TransactionError> {
        let mut credential = requirement.credential.clone();
        let mut missing = Vec::new();
        for (position, sig) in requirement.signers.iter().enumerate() {
            let source = sig
                .source
                .ok_or(TransactionError::UnresolvedSigIdx { index: sig.index })?;
            let signature = match self.get(&source) {
                Some(key) => key.sign(digest)?,
                None => {
                    warn!(address = %source, index = sig.index, "no key for signer");
                    missing.push((position, source));
                    placeholder_signature()
                }
            };
            credential.push_signature(signature);
        }
        Ok(Filled {
            credential,
            missing,
        })
    }
}

/// A signature slot that partial signing could not fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingSignature {
    pub credential_index: usize,
    pub signature_index: usize,
    pub address: ShortId,
}

/// Sign every credential of `unsigned`; any missing key is an error.
pub fn sign<U, K>(unsigned: U, keys: &K) -> Result<SignedTx<U>, TransactionError>
where
    U: UnsignedTransaction,
    K: KeySource,
{
    let (signed, missing) = sign_partial(unsigned, keys)?;
    match missing.first() {
        Some(m) => Err(TransactionError::KeyNotFound { address: m.address }),
        None => Ok(signed),
    }
}

/// Sign what `keys` can and report the rest.
///
/// Unfilled slots hold the all-zero placeholder; another party can sign
/// the same unsigned transaction and the results are combined with
/// [`SignedTx::merge`].
pub fn sign_partial<U, K>(
    unsigned: U,
    keys: &K,
) -> Result<(SignedTx<U>, Vec<MissingSignature>), TransactionError>
where
    U: UnsignedTransaction,
    K: KeySource,
{
    let digest = unsigned.hash();
    let requirements = unsigned.credential_requirements();
    let filled = keys.fill_all(&requirements, &digest, unsigned.codec())?;

    let mut credentials = Vec::with_capacity(filled.len());
    let mut missing = Vec::new();
    for (credential_index, f) in filled.into_iter().enumerate() {
        missing.extend(f.missing.into_iter().map(|(signature_index, address)| MissingSignature {
            credential_index,
            signature_index,
            address,
        }));
        credentials.push(f.credential);
    }
    debug!(
        credentials = credentials.len(),
        missing = missing.len(),
        "transaction signed"
    );
    Ok((
        SignedTx {
            unsigned,
            credentials,
        },
        missing,
    ))
}

/// An unsigned transaction with its credentials.
///
/// # Wire format
///
/// | Field           | Size                             |
/// |-----------------|----------------------------------|
/// | unsigned tx     | `codec | type ID | body`          |
/// | num credentials | 4 bytes (BE)                     |
/// | credentials     | `type ID | body` each            |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx<U: UnsignedTransaction> {
    pub unsigned: U,
    pub credentials: Vec<U::Credential>,
}

impl<U: UnsignedTransaction> SignedTx<U> {
    pub fn new(unsigned: U, credentials: Vec<U::Credential>) -> Self {
        SignedTx {
            unsigned,
            credentials,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.unsigned.write_tx(&mut writer);
        write_typed_list(&mut writer, &self.credentials, self.unsigned.codec());
        writer.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let unsigned = U::read_tx(&mut reader)?;
        let credentials = read_typed_list(&mut reader, unsigned.codec())?;
        expect_end(&reader, "signed transaction")?;
        Ok(SignedTx {
            unsigned,
            credentials,
        })
    }

    /// SHA-256 of the signed bytes.
    pub fn id(&self) -> Id {
        Id::from_sha256(&self.to_bytes())
    }

    /// Checksummed hex, the form nodes accept for issuance.
    pub fn to_hex(&self) -> String {
        cb58::check_encode_hex(&self.to_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self, TransactionError> {
        Self::from_bytes(&cb58::check_decode_hex(s)?)
    }

    pub fn to_cb58(&self) -> String {
        cb58::check_encode(&self.to_bytes())
    }

    pub fn from_cb58(s: &str) -> Result<Self, TransactionError> {
        Self::from_bytes(&cb58::check_decode(s)?)
    }

    /// Placeholder slots as `(credential index, signature index)`.
    pub fn placeholders(&self) -> Vec<(usize, usize)> {
        self.credentials
            .iter()
            .enumerate()
            .flat_map(|(c, cred)| {
                cred.signatures()
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| is_placeholder(s))
                    .map(move |(s, _)| (c, s))
            })
            .collect()
    }

    pub fn is_fully_signed(&self) -> bool {
        self.placeholders().is_empty()
    }

    /// Fill this transaction's placeholders from `other`.
    ///
    /// Both must sign the same unsigned bytes and have the same credential
    /// shape.  Returns the number of slots filled.
    pub fn merge(&mut self, other: &SignedTx<U>) -> Result<usize, TransactionError> {
        if self.unsigned.unsigned_bytes() != other.unsigned.unsigned_bytes() {
            return Err(TransactionError::malformed(
                "cannot merge signatures over different transactions",
                0,
            ));
        }
        if self.credentials.len() != other.credentials.len() {
            return Err(TransactionError::malformed(
                format!(
                    "credential count {} != {}",
                    self.credentials.len(),
                    other.credentials.len()
                ),
                0,
            ));
        }
        let mut filled = 0;
        for (mine, theirs) in self.credentials.iter_mut().zip(&other.credentials) {
            if mine.signatures().len() != theirs.signatures().len() {
                return Err(TransactionError::malformed(
                    "credential signature counts differ",
                    0,
                ));
            }
            for (slot, signature) in mine.signatures_mut().iter_mut().zip(theirs.signatures()) {
                if is_placeholder(slot) && !is_placeholder(signature) {
                    *slot = *signature;
                    filled += 1;
                }
            }
        }
        debug!(filled, "signatures merged");
        Ok(filled)
    }
}
