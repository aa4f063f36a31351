//! Signing for EVM accounts with a UTXO key chain.

use std::collections::HashMap;

use camino_primitives::ShortId;
use camino_transaction::codec::Codec;
use camino_transaction::sign::Filled;
use camino_transaction::{CredentialRequirement, CredentialVariant, KeyChain, KeySource, SigIdx, TransactionError};
use tracing::trace;

use crate::address::EthAddress;

/// A [`KeyChain`] that also answers for the EVM account of each key.
///
/// Export inputs name their signer by EVM address. Those slots are mapped
/// to the key's UTXO address before signing; every other slot is passed
/// through unchanged, so import credentials sign as usual.
pub struct EthKeyChain<'a> {
    keys: &'a KeyChain,
    accounts: HashMap<ShortId, ShortId>,
}

impl<'a> EthKeyChain<'a> {
    pub fn new(keys: &'a KeyChain) -> Self {
        let accounts = keys
            .addresses()
            .into_iter()
            .filter_map(|address| {
                let key = keys.get(&address)?;
                Some((EthAddress::from_public_key(&key.public_key()).to_short_id(), address))
            })
            .collect();
        EthKeyChain { keys, accounts }
    }

    /// The UTXO address whose key controls `account`.
    pub fn address_of(&self, account: &EthAddress) -> Option<ShortId> {
        self.accounts.get(&account.to_short_id()).copied()
    }

    /// EVM accounts the chain can sign for, ascending.
    pub fn eth_addresses(&self) -> Vec<EthAddress> {
        let mut accounts: Vec<EthAddress> = self
            .accounts
            .keys()
            .map(|id| EthAddress::new(*id.as_bytes()))
            .collect();
        accounts.sort();
        accounts
    }
}

impl KeySource for EthKeyChain<'_> {
    fn fill<C: CredentialVariant>(
        &self,
        requirement: &CredentialRequirement<C>,
        digest: &[u8],
        codec: Codec,
    ) -> Result<Filled<C>, TransactionError> {
        let signers = requirement
            .signers
            .iter()
            .map(|sig| match sig.source.and_then(|s| self.accounts.get(&s)) {
                Some(address) => {
                    trace!(index = sig.index, address = %address, "evm account signer");
                    SigIdx::with_source(sig.index, *address)
                }
                None => *sig,
            })
            .collect();
        let mapped = CredentialRequirement::new(requirement.credential.clone(), signers);
        self.keys.fill(&mapped, digest, codec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Credential;
    use camino_transaction::secp::SecpCredential;
    use camino_transaction::KeyPair;

    #[test]
    fn test_signs_for_evm_account() {
        let mut chain = KeyChain::new();
        let address = chain.add(KeyPair::from_bytes(&[0x21; 32]).unwrap());
        let account = EthAddress::from_public_key(&chain.get(&address).unwrap().public_key());
        let eth = EthKeyChain::new(&chain);
        assert_eq!(eth.address_of(&account), Some(address));
        assert_eq!(eth.eth_addresses(), vec![account]);

        let digest = [9u8; 32];
        let requirement = CredentialRequirement::new(
            Credential::Secp(SecpCredential::default()),
            vec![SigIdx::with_source(0, account.to_short_id())],
        );
        let filled = eth.fill(&requirement, &digest, Codec::V0).unwrap();
        assert!(filled.missing.is_empty());
        let signature = &filled.credential.signatures()[0];
        assert_eq!(KeyPair::recover(&digest, signature).unwrap(), chain.get(&address).unwrap().public_key());
    }

    #[test]
    fn test_unknown_account_left_missing() {
        let chain = KeyChain::new();
        let eth = EthKeyChain::new(&chain);
        let stranger = ShortId::new([4; 20]);
        let requirement = CredentialRequirement::new(
            Credential::Secp(SecpCredential::default()),
            vec![SigIdx::with_source(0, stranger)],
        );
        let filled = eth.fill(&requirement, &[1; 32], Codec::V0).unwrap();
        assert_eq!(filled.missing, vec![(0, stranger)]);
    }
}
