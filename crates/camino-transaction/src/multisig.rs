//! Multisig aliases: addresses that stand for an owner set.
//!
//! An alias address owns UTXOs like any other address, but its spend is
//! authorized by a threshold of the alias owners.  The resolver that knows
//! aliases is supplied by the caller (usually backed by chain state); this
//! module only consumes it.

use std::collections::HashMap;

use camino_primitives::ec::Signature;
use camino_primitives::ShortId;
use tracing::{debug, warn};

use crate::codec::{Codec, Variant};
use crate::entity::CredentialVariant;
use crate::keychain::KeyChain;
use crate::owners::OutputOwners;
use crate::secp::MultisigSigIdx;
use crate::sign::{placeholder_signature, CredentialRequirement, Filled, KeySource};
use crate::TransactionError;

/// Looks up the owner set behind an alias address.
pub trait MultisigResolver {
    /// The owners of `address` if it is an alias, `None` otherwise.
    fn resolve(&self, address: &ShortId) -> Option<OutputOwners>;
}

/// A fixed table of aliases.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    aliases: HashMap<ShortId, OutputOwners>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `alias` as owned by `owners`, replacing any previous entry.
    pub fn insert(&mut self, alias: ShortId, owners: OutputOwners) -> Option<OutputOwners> {
        self.aliases.insert(alias, owners)
    }

    pub fn remove(&mut self, alias: &ShortId) -> Option<OutputOwners> {
        self.aliases.remove(alias)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl MultisigResolver for AliasMap {
    fn resolve(&self, address: &ShortId) -> Option<OutputOwners> {
        self.aliases.get(address).cloned()
    }
}

/// A key source that signs for alias addresses with the alias owners' keys.
///
/// Requirements that involve no alias are signed exactly like a plain
/// [`KeyChain`].  As soon as one signer is an alias, the credential is
/// converted to the chain's multisig shape and every signature carries the
/// `(owner index, signing address)` pair it was made with.
pub struct MultisigKeyChain<'a> {
    keys: &'a KeyChain,
    resolver: &'a dyn MultisigResolver,
}

impl<'a> MultisigKeyChain<'a> {
    pub fn new(keys: &'a KeyChain, resolver: &'a dyn MultisigResolver) -> Self {
        MultisigKeyChain { keys, resolver }
    }

    /// Owners that sign for `alias`, as `(owner index, address)` ascending.
    ///
    /// Owners with keys are preferred.  When fewer than the threshold have
    /// keys, the remaining slots go to keyless owners in owner order so the
    /// credential keeps its final shape and can be completed elsewhere.
    fn alias_signers(&self, alias: &OutputOwners) -> Vec<(u32, ShortId)> {
        let needed = alias.threshold() as usize;
        let indexed = alias
            .addresses()
            .iter()
            .enumerate()
            .map(|(i, a)| (i as u32, *a));
        let (with_keys, without): (Vec<_>, Vec<_>) = indexed.partition(|(_, a)| self.keys.has(a));
        let mut chosen: Vec<(u32, ShortId)> = with_keys
            .into_iter()
            .chain(without)
            .take(needed)
            .collect();
        chosen.sort_by_key(|(i, _)| *i);
        chosen
    }

    fn sign_or_placeholder(
        &self,
        address: &ShortId,
        digest: &[u8],
        position: usize,
        missing: &mut Vec<(usize, ShortId)>,
    ) -> Result<Signature, TransactionError> {
        match self.keys.get(address) {
            Some(key) => key.sign(digest),
            None => {
                warn!(address = %address, "no key for alias owner");
                missing.push((position, *address));
                Ok(placeholder_signature())
            }
        }
    }
}

impl KeySource for MultisigKeyChain<'_> {
    fn fill<C: CredentialVariant>(
        &self,
        requirement: &CredentialRequirement<C>,
        digest: &[u8],
        codec: Codec,
    ) -> Result<Filled<C>, TransactionError> {
        let mut resolved = Vec::with_capacity(requirement.signers.len());
        for sig in &requirement.signers {
            let source = sig
                .source
                .ok_or(TransactionError::UnresolvedSigIdx { index: sig.index })?;
            resolved.push((sig.index, source, self.resolver.resolve(&source)));
        }
        if resolved.iter().all(|(_, _, alias)| alias.is_none()) {
            return self.keys.fill(requirement, digest, codec);
        }

        let type_id = requirement.credential.type_id(codec);
        let mut credential = requirement
            .credential
            .to_multisig()
            .ok_or(TransactionError::CredentialId { type_id })?;
        let multisig = credential
            .as_multisig_mut()
            .ok_or(TransactionError::CredentialId { type_id })?;

        let mut missing = Vec::new();
        for (index, source, alias) in resolved {
            match alias {
                Some(owners) => {
                    let signers = self.alias_signers(&owners);
                    debug!(
                        alias = %source,
                        threshold = owners.threshold(),
                        signers = signers.len(),
                        "signing for alias"
                    );
                    for (owner_index, address) in signers {
                        let position = multisig.signatures.len();
                        let signature = self.sign_or_placeholder(&address, digest, position, &mut missing)?;
                        multisig.push(
                            MultisigSigIdx {
                                index: owner_index,
                                source: address,
                            },
                            signature,
                        );
                    }
                }
                None => {
                    let position = multisig.signatures.len();
                    let signature = self.sign_or_placeholder(&source, digest, position, &mut missing)?;
                    multisig.push(MultisigSigIdx { index, source }, signature);
                }
            }
        }
        Ok(Filled {
            credential,
            missing,
        })
    }
}
