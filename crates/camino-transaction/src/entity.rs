//! Capabilities the spend and signing engines need from each chain's
//! output, input and credential sum types.

use camino_primitives::ec::Signature;

use crate::codec::Variant;
use crate::lock::LockState;
use crate::owners::OutputOwners;
use crate::secp::{MultisigCredential, SigIdx};
use crate::TransactionError;

/// An output variant the spend engine can read and produce.
pub trait OutputVariant: Variant + Clone {
    /// Value held; zero for outputs that carry none (owner-only, NFTs).
    fn amount(&self) -> u64;

    /// Who may spend this output.
    fn owners(&self) -> &OutputOwners;

    /// Lock wrapping this output, as written on the wire.
    fn lock_state(&self) -> LockState {
        LockState::Unlocked
    }

    /// Build a transfer output of `amount` to `owners` in `lock`.
    ///
    /// Chains without lock variants return `UnsupportedLock` for anything
    /// other than `LockState::Unlocked`.
    fn locked(amount: u64, owners: OutputOwners, lock: &LockState) -> Result<Self, TransactionError>;
}

/// An input variant the spend engine can produce and the signer can read.
pub trait InputVariant: Variant + Clone {
    /// Credential variant that satisfies this input.
    type Credential: CredentialVariant;

    fn amount(&self) -> u64;

    /// Signers in the order their signatures must appear.
    fn sig_indices(&self) -> &[SigIdx];

    fn sig_indices_mut(&mut self) -> &mut Vec<SigIdx>;

    /// An empty credential of the matching variant.
    fn credential(&self) -> Self::Credential;

    /// Build an input spending an output held in `lock`.
    fn spending(amount: u64, sig_indices: Vec<SigIdx>, lock: &LockState) -> Result<Self, TransactionError>;
}

/// A credential variant the signer can fill.
pub trait CredentialVariant: Variant + Clone {
    fn signatures(&self) -> &[Signature];

    fn signatures_mut(&mut self) -> &mut Vec<Signature>;

    fn push_signature(&mut self, signature: Signature) {
        self.signatures_mut().push(signature);
    }

    /// An empty multisig credential of this chain, if it has one.
    fn to_multisig(&self) -> Option<Self> {
        None
    }

    /// Access the multisig shape when this is a multisig credential.
    fn as_multisig_mut(&mut self) -> Option<&mut MultisigCredential> {
        None
    }
}
