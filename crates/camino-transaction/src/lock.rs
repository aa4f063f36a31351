//! Lock states of outputs and the lock modes a spend can run in.

use camino_primitives::Id;

const fn this_tx_bytes() -> [u8; 32] {
    let tag = b"this tx id";
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < tag.len() {
        out[i] = tag[i];
        i += 1;
    }
    out
}

/// Placeholder meaning "the transaction that carries this output".
///
/// A deposit or bond created by a transaction cannot name its own ID, so
/// the output records this marker and the chain substitutes the real ID.
pub const THIS_TX_ID: Id = Id::new(this_tx_bytes());

/// The deposit and bond transactions an output is locked by.
///
/// The zero ID in either slot means "not locked this way".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LockedIds {
    pub deposit_tx_id: Id,
    pub bond_tx_id: Id,
}

impl LockedIds {
    pub fn new(deposit_tx_id: Id, bond_tx_id: Id) -> Self {
        LockedIds {
            deposit_tx_id,
            bond_tx_id,
        }
    }

    pub fn is_deposited(&self) -> bool {
        !self.deposit_tx_id.is_zero()
    }

    pub fn is_bonded(&self) -> bool {
        !self.bond_tx_id.is_zero()
    }

    pub fn is_locked(&self) -> bool {
        self.is_deposited() || self.is_bonded()
    }
}

/// How the value of an output is encumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LockState {
    #[default]
    Unlocked,
    /// Usable only for staking until `locktime` (unix seconds).
    StakeableLocked { locktime: u64 },
    /// Held by a deposit and/or bond.
    Locked(LockedIds),
}

impl LockState {
    /// The state as seen at `as_of`: an expired stakeable lock is unlocked,
    /// as are locked IDs with both slots empty.
    pub fn effective(&self, as_of: u64) -> LockState {
        match *self {
            LockState::StakeableLocked { locktime } if locktime <= as_of => LockState::Unlocked,
            LockState::Locked(ids) if !ids.is_locked() => LockState::Unlocked,
            other => other,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, LockState::Unlocked)
    }
}

/// What a spend is for, which decides the UTXOs it may draw from and the
/// lock state of what it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockMode {
    /// Plain transfer from unlocked funds.
    #[default]
    Unlocked,
    /// Staking; stakeable-locked funds may be used and keep their lock.
    Stake,
    /// Deposit unlocked or bonded funds.
    Deposit,
    /// Bond unlocked or deposited funds.
    Bond,
}

impl LockMode {
    /// Whether a UTXO in `state` (already made effective) may be consumed.
    pub fn accepts(&self, state: &LockState) -> bool {
        match (self, state) {
            (_, LockState::Unlocked) => true,
            (LockMode::Stake, LockState::StakeableLocked { .. }) => true,
            (LockMode::Deposit, LockState::Locked(ids)) => !ids.is_deposited(),
            (LockMode::Bond, LockState::Locked(ids)) => !ids.is_bonded(),
            _ => false,
        }
    }

    /// Lock state of the value this spend moves to its destination when it
    /// was drawn from a UTXO in `state`.
    pub fn target(&self, state: &LockState) -> LockState {
        match (self, state) {
            (LockMode::Unlocked, _) => LockState::Unlocked,
            (LockMode::Stake, s) => *s,
            (LockMode::Deposit, LockState::Locked(ids)) => {
                LockState::Locked(LockedIds::new(THIS_TX_ID, ids.bond_tx_id))
            }
            (LockMode::Deposit, _) => LockState::Locked(LockedIds::new(THIS_TX_ID, Id::ZERO)),
            (LockMode::Bond, LockState::Locked(ids)) => {
                LockState::Locked(LockedIds::new(ids.deposit_tx_id, THIS_TX_ID))
            }
            (LockMode::Bond, _) => LockState::Locked(LockedIds::new(Id::ZERO, THIS_TX_ID)),
        }
    }

    /// Whether the destination amount is staked rather than paid out.
    pub fn stakes(&self) -> bool {
        matches!(self, LockMode::Stake)
    }
}
