//! Coin selection.
//!
//! Turns an [`AssetAmountDestination`] into balanced inputs and outputs
//! drawn from a [`UtxoSet`].  Selection is deterministic: eligible UTXOs are
//! ordered lock-restricted first, then by amount ascending, tx ID and
//! output index, and consumed greedily.

use std::collections::{BTreeMap, BTreeSet};

use camino_primitives::{Id, ShortId};
use tracing::{debug, trace};

use crate::codec::Codec;
use crate::entity::{InputVariant, OutputVariant};
use crate::lock::{LockMode, LockState};
use crate::multisig::MultisigResolver;
use crate::owners::OutputOwners;
use crate::secp::{InputBuilder, SigIdx};
use crate::transferable::{sort_outputs, TransferableInput, TransferableOutput};
use crate::utxo::Utxo;
use crate::utxo_set::UtxoSet;
use crate::TransactionError;

/// How much of one asset to move and how much to burn as a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetAmount {
    pub asset_id: Id,
    pub amount: u64,
    pub burn: u64,
}

/// Who pays, who signs, who receives, and where change goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetAmountDestination {
    /// Owners whose UTXOs may be consumed.  Empty means "same as signers".
    pub senders: Vec<ShortId>,
    /// Addresses that will sign.
    pub signers: Vec<ShortId>,
    pub destinations: Vec<ShortId>,
    pub destination_threshold: u32,
    pub destination_locktime: u64,
    pub change_addresses: Vec<ShortId>,
    pub change_threshold: u32,
    pub amounts: Vec<AssetAmount>,
}

impl AssetAmountDestination {
    /// Threshold-1 destination and change; the senders also sign.
    pub fn new(senders: Vec<ShortId>, destinations: Vec<ShortId>, change_addresses: Vec<ShortId>) -> Self {
        AssetAmountDestination {
            signers: senders.clone(),
            senders,
            destinations,
            destination_threshold: 1,
            destination_locktime: 0,
            change_addresses,
            change_threshold: 1,
            amounts: Vec::new(),
        }
    }

    /// Add an asset to move.  Amounts for the same asset are summed.
    pub fn add_amount(&mut self, asset_id: Id, amount: u64, burn: u64) -> Result<&mut Self, TransactionError> {
        match self.amounts.iter_mut().find(|a| a.asset_id == asset_id) {
            Some(existing) => {
                existing.amount = checked_sum(existing.amount, amount)?;
                existing.burn = checked_sum(existing.burn, burn)?;
            }
            None => self.amounts.push(AssetAmount {
                asset_id,
                amount,
                burn,
            }),
        }
        Ok(self)
    }

    fn destination_owners(&self) -> Result<OutputOwners, TransactionError> {
        OutputOwners::new(
            self.destination_locktime,
            self.destination_threshold,
            self.destinations.iter().copied(),
        )
    }

    fn change_owners(&self) -> Result<OutputOwners, TransactionError> {
        OutputOwners::new(0, self.change_threshold, self.change_addresses.iter().copied())
    }
}

/// The result of a spend: sorted inputs and outputs.
///
/// Destination value lands in `destination_outputs` when the spender keeps
/// it apart (staking, exports) and in `outputs` otherwise.  Change is
/// always in `outputs`.  `input_owners[i]` is the owner set of the UTXO
/// behind `inputs[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spend<I, O> {
    pub inputs: Vec<TransferableInput<I>>,
    pub outputs: Vec<TransferableOutput<O>>,
    pub destination_outputs: Vec<TransferableOutput<O>>,
    pub input_owners: Vec<OutputOwners>,
    pub burned: u64,
}

/// Plans spends against a snapshot of UTXOs.
pub struct Spender<'a, O> {
    utxos: &'a UtxoSet<O>,
    lock_mode: LockMode,
    as_of: u64,
    codec: Codec,
    resolver: Option<&'a dyn MultisigResolver>,
    split_destination: bool,
}

fn checked_sum(a: u64, b: u64) -> Result<u64, TransactionError> {
    a.checked_add(b)
        .ok_or_else(|| TransactionError::AmountOutOfRange(format!("{} + {} overflows", a, b)))
}

struct Candidate<'u, O> {
    utxo: &'u Utxo<O>,
    effective: LockState,
    restricted: bool,
    signers: Vec<SigIdx>,
}

impl<'a, O: OutputVariant> Spender<'a, O> {
    pub fn new(utxos: &'a UtxoSet<O>) -> Self {
        Spender {
            utxos,
            lock_mode: LockMode::Unlocked,
            as_of: 0,
            codec: Codec::V0,
            resolver: None,
            split_destination: false,
        }
    }

    pub fn lock_mode(mut self, lock_mode: LockMode) -> Self {
        self.lock_mode = lock_mode;
        self
    }

    /// Time (unix seconds) at which locktimes are evaluated.
    pub fn as_of(mut self, as_of: u64) -> Self {
        self.as_of = as_of;
        self
    }

    /// Codec used to order outputs by their encoding.
    pub fn codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Keep destination outputs apart from change.  Implied by
    /// `LockMode::Stake`.
    pub fn split_destination(mut self, split: bool) -> Self {
        self.split_destination = split;
        self
    }

    /// Consult `resolver` for owners that are multisig aliases.
    pub fn resolver(mut self, resolver: &'a dyn MultisigResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Select UTXOs and build balanced inputs and outputs.
    ///
    /// Exactly one asset may be requested.  On success
    /// `sum(inputs) == sum(outputs) + sum(destination_outputs) + burned`.
    pub fn spend<I: InputVariant>(
        &self,
        aad: &AssetAmountDestination,
    ) -> Result<Spend<I, O>, TransactionError> {
        let request = match aad.amounts.as_slice() {
            [single] => *single,
            other => return Err(TransactionError::MultiAssetSpend(other.len())),
        };
        let needed = checked_sum(request.amount, request.burn)?;

        let signer_set: BTreeSet<ShortId> = aad.signers.iter().copied().collect();
        let senders = if aad.senders.is_empty() {
            &aad.signers
        } else {
            &aad.senders
        };

        let mut candidates = self.candidates(request.asset_id, senders, &signer_set);
        let available = candidates
            .iter()
            .try_fold(0u64, |acc, c| checked_sum(acc, c.utxo.amount()))?;
        let burnable = candidates
            .iter()
            .filter(|c| c.effective.is_unlocked())
            .try_fold(0u64, |acc, c| checked_sum(acc, c.utxo.amount()))?;
        if available < needed || burnable < request.burn {
            debug!(
                asset = %request.asset_id,
                needed,
                available,
                burnable,
                "insufficient funds"
            );
            return Err(TransactionError::InsufficientFunds {
                asset_id: request.asset_id,
                needed,
                available,
            });
        }

        candidates.sort_by(|a, b| {
            b.restricted
                .cmp(&a.restricted)
                .then(a.utxo.amount().cmp(&b.utxo.amount()))
                .then(a.utxo.tx_id.cmp(&b.utxo.tx_id))
                .then(a.utxo.output_index.cmp(&b.utxo.output_index))
        });

        let destination_owners = if request.amount > 0 {
            Some(aad.destination_owners()?)
        } else {
            None
        };
        let change_owners = aad.change_owners();

        let mut remaining_amount = request.amount;
        let mut remaining_burn = request.burn;
        // Only unlocked value can be burned.
        let mut unlocked_left = burnable;

        let mut inputs: Vec<(TransferableInput<I>, OutputOwners)> = Vec::new();
        let mut produced: BTreeMap<(LockState, OutputOwners), u64> = BTreeMap::new();
        let mut apart: BTreeMap<(LockState, OutputOwners), u64> = BTreeMap::new();
        let mut consumed_total = 0u64;

        for candidate in &candidates {
            if remaining_amount == 0 && remaining_burn == 0 {
                break;
            }
            let can_burn = candidate.effective.is_unlocked();
            if !can_burn && remaining_amount == 0 {
                continue;
            }
            let value = candidate.utxo.amount();

            let mut to_destination = value.min(remaining_amount);
            if can_burn {
                // Hold back what later unlocked UTXOs cannot burn.
                let reserve_after = unlocked_left - value;
                let burn_shortfall = remaining_burn.saturating_sub(reserve_after);
                to_destination = to_destination.min(value - burn_shortfall.min(value));
                unlocked_left = reserve_after;
            }
            remaining_amount -= to_destination;
            let mut left = value - to_destination;

            let to_burn = if can_burn { left.min(remaining_burn) } else { 0 };
            remaining_burn -= to_burn;
            left -= to_burn;

            trace!(
                utxo = %candidate.utxo.id(),
                value,
                to_destination,
                to_burn,
                change = left,
                "utxo consumed"
            );

            if let (true, Some(owners)) = (to_destination > 0, &destination_owners) {
                let target = self.lock_mode.target(&candidate.effective);
                let bucket = if self.split_destination || self.lock_mode.stakes() {
                    &mut apart
                } else {
                    &mut produced
                };
                let slot = bucket.entry((target, owners.clone())).or_insert(0);
                *slot = checked_sum(*slot, to_destination)?;
            }
            if left > 0 {
                let owners = change_owners
                    .as_ref()
                    .map_err(|e| TransactionError::InvalidOwners(e.to_string()))?;
                let slot = produced
                    .entry((candidate.effective, owners.clone()))
                    .or_insert(0);
                *slot = checked_sum(*slot, left)?;
            }

            let mut builder = InputBuilder::new(value).lock(candidate.utxo.lock_state());
            for sig in &candidate.signers {
                if let Some(source) = sig.source {
                    builder.add_signature_index(sig.index, source);
                }
            }
            let input = TransferableInput::new(
                candidate.utxo.tx_id,
                candidate.utxo.output_index,
                candidate.utxo.asset_id,
                builder.build::<I>()?,
            );
            inputs.push((input, candidate.utxo.owners().clone()));
            consumed_total = checked_sum(consumed_total, value)?;
        }

        if remaining_amount > 0 || remaining_burn > 0 {
            return Err(TransactionError::InsufficientFunds {
                asset_id: request.asset_id,
                needed,
                available,
            });
        }

        let outputs = self.build_outputs(request.asset_id, produced)?;
        let destination_outputs = self.build_outputs(request.asset_id, apart)?;

        let output_total = outputs
            .iter()
            .chain(destination_outputs.iter())
            .try_fold(0u64, |acc, o| checked_sum(acc, o.output.amount()))?;
        if checked_sum(output_total, request.burn)? != consumed_total {
            return Err(TransactionError::BalanceInvariant {
                inputs: consumed_total,
                outputs: output_total,
                burned: request.burn,
            });
        }

        inputs.sort_by_key(|(i, _)| (i.tx_id, i.output_index));
        let (inputs, input_owners): (Vec<_>, Vec<_>) = inputs.into_iter().unzip();

        debug!(
            asset = %request.asset_id,
            mode = ?self.lock_mode,
            inputs = inputs.len(),
            outputs = outputs.len(),
            destination_outputs = destination_outputs.len(),
            consumed = consumed_total,
            burned = request.burn,
            "spend planned"
        );

        Ok(Spend {
            inputs,
            outputs,
            destination_outputs,
            input_owners,
            burned: request.burn,
        })
    }

    fn candidates<'u>(
        &'u self,
        asset_id: Id,
        senders: &[ShortId],
        signer_set: &BTreeSet<ShortId>,
    ) -> Vec<Candidate<'u, O>> {
        let as_of = self.as_of;
        self.utxos
            .for_addresses(senders)
            .into_iter()
            .filter(|u| u.asset_id == asset_id && u.amount() > 0)
            .filter_map(|utxo| {
                let effective = utxo.lock_state().effective(as_of);
                if !self.lock_mode.accepts(&effective) {
                    trace!(utxo = %utxo.id(), lock = ?effective, "lock state not usable");
                    return None;
                }
                let signers = utxo
                    .owners()
                    .select_signers(as_of, |a| self.can_sign(a, signer_set))?;
                Some(Candidate {
                    utxo,
                    restricted: !effective.is_unlocked(),
                    effective,
                    signers,
                })
            })
            .collect()
    }

    fn can_sign(&self, address: &ShortId, signer_set: &BTreeSet<ShortId>) -> bool {
        if signer_set.contains(address) {
            return true;
        }
        match self.resolver.and_then(|r| r.resolve(address)) {
            Some(alias) => alias
                .select_signers(self.as_of, |a| signer_set.contains(a))
                .is_some(),
            None => false,
        }
    }

    fn build_outputs(
        &self,
        asset_id: Id,
        buckets: BTreeMap<(LockState, OutputOwners), u64>,
    ) -> Result<Vec<TransferableOutput<O>>, TransactionError> {
        let mut outputs = buckets
            .into_iter()
            .map(|((lock, owners), amount)| {
                O::locked(amount, owners, &lock).map(|o| TransferableOutput::new(asset_id, o))
            })
            .collect::<Result<Vec<_>, _>>()?;
        sort_outputs(&mut outputs, self.codec);
        Ok(outputs)
    }
}
