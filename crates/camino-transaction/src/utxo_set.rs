//! An indexed collection of UTXOs.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use camino_primitives::{Id, ShortId};
use tracing::{debug, trace};

use crate::entity::OutputVariant;
use crate::utxo::{Utxo, UtxoId};
use crate::TransactionError;

/// UTXOs keyed by `(tx ID, output index)` with an index by owner address.
///
/// Iteration is in key order, so everything built from a set is
/// deterministic.  The set is a snapshot: the spend engine only reads it,
/// and callers remove consumed UTXOs between spends.
#[derive(Debug, Clone)]
pub struct UtxoSet<O> {
    utxos: BTreeMap<UtxoId, Utxo<O>>,
    by_address: HashMap<ShortId, BTreeSet<UtxoId>>,
}

impl<O> Default for UtxoSet<O> {
    fn default() -> Self {
        UtxoSet {
            utxos: BTreeMap::new(),
            by_address: HashMap::new(),
        }
    }
}

impl<O: OutputVariant> UtxoSet<O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a UTXO, replacing any with the same ID.  Returns the replaced one.
    pub fn add(&mut self, utxo: Utxo<O>) -> Option<Utxo<O>> {
        let id = utxo.id();
        let replaced = self.remove(&id);
        for address in utxo.owners().addresses() {
            self.by_address.entry(*address).or_default().insert(id);
        }
        trace!(utxo = %id, amount = utxo.amount(), "utxo added");
        self.utxos.insert(id, utxo);
        replaced
    }

    /// Insert many UTXOs.
    pub fn add_all(&mut self, utxos: impl IntoIterator<Item = Utxo<O>>) {
        for utxo in utxos {
            self.add(utxo);
        }
    }

    /// Decode and insert UTXOs in their node hex form.
    pub fn add_hex(&mut self, encoded: &[impl AsRef<str>]) -> Result<usize, TransactionError> {
        let decoded = encoded
            .iter()
            .map(|s| Utxo::from_hex(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let count = decoded.len();
        self.add_all(decoded);
        debug!(count, total = self.len(), "utxos decoded from hex");
        Ok(count)
    }

    /// Decode and insert UTXOs in CB58 form.
    pub fn add_cb58(&mut self, encoded: &[impl AsRef<str>]) -> Result<usize, TransactionError> {
        let decoded = encoded
            .iter()
            .map(|s| Utxo::from_cb58(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let count = decoded.len();
        self.add_all(decoded);
        debug!(count, total = self.len(), "utxos decoded from cb58");
        Ok(count)
    }

    pub fn remove(&mut self, id: &UtxoId) -> Option<Utxo<O>> {
        let utxo = self.utxos.remove(id)?;
        for address in utxo.owners().addresses() {
            if let Some(ids) = self.by_address.get_mut(address) {
                ids.remove(id);
                if ids.is_empty() {
                    self.by_address.remove(address);
                }
            }
        }
        trace!(utxo = %id, "utxo removed");
        Some(utxo)
    }

    pub fn get(&self, id: &UtxoId) -> Option<&Utxo<O>> {
        self.utxos.get(id)
    }

    pub fn contains(&self, id: &UtxoId) -> bool {
        self.utxos.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// All UTXOs in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Utxo<O>> {
        self.utxos.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &UtxoId> {
        self.utxos.keys()
    }

    /// UTXOs with any of `addresses` among their owners, in ID order.
    pub fn for_addresses(&self, addresses: &[ShortId]) -> Vec<&Utxo<O>> {
        let ids: BTreeSet<&UtxoId> = addresses
            .iter()
            .filter_map(|a| self.by_address.get(a))
            .flatten()
            .collect();
        ids.into_iter().filter_map(|id| self.utxos.get(id)).collect()
    }

    /// Distinct asset IDs held, ascending.
    pub fn asset_ids(&self) -> Vec<Id> {
        self.utxos
            .values()
            .map(|u| u.asset_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Unlocked amount of `asset_id` that `addresses` can spend at `as_of`.
    ///
    /// Fails only if the total overflows.
    pub fn balance(
        &self,
        addresses: &[ShortId],
        asset_id: &Id,
        as_of: u64,
    ) -> Result<u64, TransactionError> {
        let signers: BTreeSet<&ShortId> = addresses.iter().collect();
        self.for_addresses(addresses)
            .into_iter()
            .filter(|u| u.asset_id == *asset_id)
            .filter(|u| u.lock_state().effective(as_of).is_unlocked())
            .filter(|u| {
                u.owners()
                    .select_signers(as_of, |a| signers.contains(a))
                    .is_some()
            })
            .try_fold(0u64, |acc, u| {
                acc.checked_add(u.amount()).ok_or_else(|| {
                    TransactionError::AmountOutOfRange(format!("balance of {} overflows", asset_id))
                })
            })
    }

    /// UTXOs in either set; `other` wins on conflicting IDs.
    pub fn union(&self, other: &UtxoSet<O>) -> UtxoSet<O> {
        let mut out = self.clone();
        out.add_all(other.iter().cloned());
        out
    }

    /// UTXOs in this set that are not in `other`.
    pub fn difference(&self, other: &UtxoSet<O>) -> UtxoSet<O> {
        let mut out = UtxoSet::new();
        out.add_all(self.iter().filter(|u| !other.contains(&u.id())).cloned());
        out
    }

    /// UTXOs in both sets.
    pub fn intersection(&self, other: &UtxoSet<O>) -> UtxoSet<O> {
        let mut out = UtxoSet::new();
        out.add_all(self.iter().filter(|u| other.contains(&u.id())).cloned());
        out
    }
}
