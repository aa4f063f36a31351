//! High-level platform transaction builders over a UTXO snapshot.
//!
//! Every builder pays its fee in the native asset.  Staking spends keep
//! stakeable-locked value locked; Camino deposits and bonds lock the moved
//! value to the transaction being built (see
//! [`THIS_TX_ID`](camino_transaction::lock::THIS_TX_ID)).

use std::collections::BTreeMap;

use camino_primitives::network::{FeeSchedule, NetworkConfig};
use camino_primitives::{Id, NodeId, PrimitivesError, ShortId};
use camino_transaction::transferable::{sort_inputs, sort_outputs};
use camino_transaction::{
    AssetAmountDestination, Codec, InputBuilder, LockMode, LockState, LockedIds, MultisigResolver,
    OutputOwners, OutputVariant, Spend, Spender, SubnetAuth, TransactionError, TransferableInput,
    TransferableOutput, UtxoSet,
};
use tracing::debug;

use crate::delegation_fee::DelegationFee;
use crate::inputs::Input;
use crate::outputs::Output;
use crate::txs::{
    AddDelegatorTx, AddSubnetValidatorTx, AddValidatorTx, AddressStateTx, BaseTx, CaminoAddValidatorTx, ClaimTx,
    ClaimType, Claimable, CreateChainTx, CreateSubnetTx, DepositTx, ExportTx, ImportTx, MultisigAlias,
    MultisigAliasTx, RegisterNodeTx, RemoveSubnetValidatorTx, SubnetValidator, Transaction, UnlockDepositTx,
    Validator,
};
use crate::type_ids;
use crate::unsigned::UnsignedTx;

/// A reward claim to include in a [`ClaimTx`]: what is claimed and the
/// owner set that authorizes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub owner_id: Id,
    pub claim_type: ClaimType,
    pub amount: u64,
    pub owners: OutputOwners,
}

/// Builds platform chain transactions for one network.
pub struct TxBuilder<'a> {
    network_id: u32,
    blockchain_id: Id,
    fee_asset_id: Id,
    fees: FeeSchedule,
    codec: Codec,
    as_of: u64,
    utxos: &'a UtxoSet<Output>,
    resolver: Option<&'a dyn MultisigResolver>,
}

impl<'a> TxBuilder<'a> {
    pub fn new(network_id: u32, blockchain_id: Id, fee_asset_id: Id, utxos: &'a UtxoSet<Output>) -> Self {
        TxBuilder {
            network_id,
            blockchain_id,
            fee_asset_id,
            fees: FeeSchedule::default(),
            codec: Codec::V0,
            as_of: 0,
            utxos,
            resolver: None,
        }
    }

    /// Take network ID, platform chain ID, fee asset and fees from `config`.
    pub fn from_config(config: &NetworkConfig, utxos: &'a UtxoSet<Output>) -> Result<Self, TransactionError> {
        let fee_asset_id = config.native_asset_id.ok_or_else(|| {
            PrimitivesError::InvalidConfig("native asset id is not set".to_string())
        })?;
        Ok(Self::new(config.network_id, config.p_chain_id, fee_asset_id, utxos).fees(config.fees))
    }

    pub fn fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    pub fn codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Time at which locktimes are evaluated.
    pub fn as_of(mut self, as_of: u64) -> Self {
        self.as_of = as_of;
        self
    }

    /// Spend UTXOs owned by multisig aliases the signers control.
    pub fn resolver(mut self, resolver: &'a dyn MultisigResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    fn spender(&self, mode: LockMode) -> Spender<'a, Output> {
        let spender = Spender::new(self.utxos)
            .lock_mode(mode)
            .as_of(self.as_of)
            .codec(self.codec);
        match self.resolver {
            Some(resolver) => spender.resolver(resolver),
            None => spender,
        }
    }

    /// Move `amount` of the native asset to `to` under `mode` and burn `fee`.
    #[allow(clippy::too_many_arguments)]
    fn spend(
        &self,
        mode: LockMode,
        amount: u64,
        fee: u64,
        to: &[ShortId],
        from: &[ShortId],
        change: &[ShortId],
        split: bool,
    ) -> Result<Spend<Input, Output>, TransactionError> {
        let mut aad = AssetAmountDestination::new(from.to_vec(), to.to_vec(), change.to_vec());
        aad.add_amount(self.fee_asset_id, amount, fee)?;
        self.spender(mode).split_destination(split).spend(&aad)
    }

    fn spend_fee(&self, fee: u64, from: &[ShortId], change: &[ShortId]) -> Result<Spend<Input, Output>, TransactionError> {
        self.spend(LockMode::Unlocked, 0, fee, &[], from, change, false)
    }

    fn base(
        &self,
        inputs: Vec<TransferableInput<Input>>,
        outputs: Vec<TransferableOutput<Output>>,
        memo: &[u8],
    ) -> Result<BaseTx, TransactionError> {
        let mut base = BaseTx::new(self.network_id, self.blockchain_id).with_memo(memo.to_vec())?;
        base.inputs = inputs;
        base.outputs = outputs;
        sort_inputs(&mut base.inputs);
        sort_outputs(&mut base.outputs, self.codec);
        Ok(base)
    }

    fn fee_only_base(&self, fee: u64, from: &[ShortId], change: &[ShortId], memo: &[u8]) -> Result<BaseTx, TransactionError> {
        let spend = self.spend_fee(fee, from, change)?;
        self.base(spend.inputs, spend.outputs, memo)
    }

    /// Authorization by `owners`, signed by whichever of `signers` meet the
    /// threshold.
    fn owners_auth(&self, owners: &OutputOwners, signers: &[ShortId]) -> Result<SubnetAuth, TransactionError> {
        let sig_indices = owners
            .select_signers(self.as_of, |a| signers.contains(a))
            .ok_or_else(|| TransactionError::InvalidOwners("signers do not meet the owner threshold".to_string()))?;
        Ok(SubnetAuth::new(sig_indices))
    }

    fn finish(&self, tx: Transaction) -> UnsignedTx {
        let base = tx.base();
        debug!(
            chain = %self.blockchain_id,
            inputs = base.inputs.len(),
            outputs = base.outputs.len(),
            codec = %self.codec,
            "platform chain transaction built"
        );
        UnsignedTx::new(self.codec, tx)
    }

    /// Send `amount` of the native asset to `to`.
    pub fn base_tx(
        &self,
        amount: u64,
        to: &[ShortId],
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let spend = self.spend(LockMode::Unlocked, amount, self.fees.tx_fee, to, from, change, false)?;
        let base = self.base(spend.inputs, spend.outputs, memo)?;
        Ok(self.finish(Transaction::Base(base)))
    }

    /// Stake `validator.weight` to validate the primary network.
    ///
    /// Stake outputs are owned by `change`; rewards go to `reward_to`.
    pub fn add_validator_tx(
        &self,
        validator: Validator,
        reward_to: &[ShortId],
        delegation_fee: DelegationFee,
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let spend = self.spend(
            LockMode::Stake,
            validator.weight,
            self.fees.add_validator_fee,
            change,
            from,
            change,
            true,
        )?;
        let base = self.base(spend.inputs, spend.outputs, memo)?;
        let rewards_owner = OutputOwners::new(0, 1, reward_to.iter().copied())?;
        let tx = AddValidatorTx::new(
            base,
            validator,
            spend.destination_outputs,
            rewards_owner,
            delegation_fee,
            self.codec,
        );
        Ok(self.finish(Transaction::AddValidator(tx)))
    }

    /// Delegate `validator.weight` to an existing validator.
    pub fn add_delegator_tx(
        &self,
        validator: Validator,
        reward_to: &[ShortId],
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let spend = self.spend(
            LockMode::Stake,
            validator.weight,
            self.fees.add_validator_fee,
            change,
            from,
            change,
            true,
        )?;
        let base = self.base(spend.inputs, spend.outputs, memo)?;
        let rewards_owner = OutputOwners::new(0, 1, reward_to.iter().copied())?;
        let tx = AddDelegatorTx::new(base, validator, spend.destination_outputs, rewards_owner, self.codec);
        Ok(self.finish(Transaction::AddDelegator(tx)))
    }

    /// Bond `validator.weight` to a Camino validator registered to
    /// `node_owner`.
    ///
    /// The bond stays in the base outputs, locked to this transaction; the
    /// stake list is empty.  `node_owner` may be an alias.
    #[allow(clippy::too_many_arguments)]
    pub fn camino_add_validator_tx(
        &self,
        validator: Validator,
        node_owner: ShortId,
        reward_to: &[ShortId],
        delegation_fee: DelegationFee,
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let spend = self.spend(
            LockMode::Bond,
            validator.weight,
            self.fees.add_validator_fee,
            change,
            from,
            change,
            false,
        )?;
        let base = self.base(spend.inputs, spend.outputs, memo)?;
        let tx = CaminoAddValidatorTx {
            base,
            validator,
            stake: Vec::new(),
            rewards_owner: OutputOwners::new(0, 1, reward_to.iter().copied())?,
            delegation_fee,
            node_owner,
            node_owner_auth: SubnetAuth::from_signers(&[(0, node_owner)]),
        };
        Ok(self.finish(Transaction::CaminoAddValidator(tx)))
    }

    /// Deposit `amount` under `offer_id` for `duration` seconds.
    ///
    /// Under codec 1, `creator` names the deposit creator, which must
    /// authorize the deposit.
    #[allow(clippy::too_many_arguments)]
    pub fn deposit_tx(
        &self,
        offer_id: Id,
        duration: u32,
        amount: u64,
        reward_to: &[ShortId],
        creator: Option<ShortId>,
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let spend = self.spend(LockMode::Deposit, amount, self.fees.tx_fee, change, from, change, false)?;
        let base = self.base(spend.inputs, spend.outputs, memo)?;
        let mut tx = DepositTx {
            base,
            deposit_offer_id: offer_id,
            deposit_duration: duration,
            rewards_owner: OutputOwners::new(0, 1, reward_to.iter().copied())?,
            ..Default::default()
        };
        if let (true, Some(creator)) = (type_ids::has_creator_auth(self.codec), creator) {
            tx.deposit_creator = creator;
            tx.deposit_creator_auth = SubnetAuth::from_signers(&[(0, creator)]);
        }
        Ok(self.finish(Transaction::Deposit(tx)))
    }

    /// Release every deposit in `deposit_tx_ids` held by `from`.
    ///
    /// Unlocked value keeps any bond it had.  The fee is paid separately
    /// from unlocked funds.
    pub fn unlock_deposit_tx(
        &self,
        deposit_tx_ids: &[Id],
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for utxo in self.utxos.for_addresses(from) {
            let LockState::Locked(ids) = utxo.lock_state() else {
                continue;
            };
            if utxo.asset_id != self.fee_asset_id || !deposit_tx_ids.contains(&ids.deposit_tx_id) {
                continue;
            }
            let Some(signers) = utxo.owners().select_signers(self.as_of, |a| from.contains(a)) else {
                continue;
            };
            let mut builder = InputBuilder::new(utxo.amount()).lock(utxo.lock_state());
            for sig in signers {
                if let Some(source) = sig.source {
                    builder.add_signature_index(sig.index, source);
                }
            }
            inputs.push(TransferableInput::new(
                utxo.tx_id,
                utxo.output_index,
                utxo.asset_id,
                builder.build::<Input>()?,
            ));
            let remaining = LockState::Locked(LockedIds::new(Id::ZERO, ids.bond_tx_id));
            outputs.push(TransferableOutput::new(
                utxo.asset_id,
                Output::locked(utxo.amount(), utxo.owners().clone(), &remaining)?,
            ));
        }
        if inputs.is_empty() {
            return Err(TransactionError::InsufficientFunds {
                asset_id: self.fee_asset_id,
                needed: 1,
                available: 0,
            });
        }
        if self.fees.tx_fee > 0 {
            let spend = self.spend_fee(self.fees.tx_fee, from, change)?;
            inputs.extend(spend.inputs);
            outputs.extend(spend.outputs);
        }
        let base = self.base(inputs, outputs, memo)?;
        Ok(self.finish(Transaction::UnlockDeposit(UnlockDepositTx { base })))
    }

    /// Create a subnet owned by `threshold` of `owners`.
    pub fn create_subnet_tx(
        &self,
        owners: &[ShortId],
        threshold: u32,
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let base = self.fee_only_base(self.fees.create_subnet_tx_fee, from, change, memo)?;
        let owner = OutputOwners::new(0, threshold, owners.iter().copied())?;
        Ok(self.finish(Transaction::CreateSubnet(CreateSubnetTx { base, owner })))
    }

    /// Create a chain in `subnet_id`, authorized by the subnet owners.
    #[allow(clippy::too_many_arguments)]
    pub fn create_chain_tx(
        &self,
        subnet_id: Id,
        subnet_owners: &OutputOwners,
        chain_name: &str,
        vm_id: Id,
        fx_ids: Vec<Id>,
        genesis_data: Vec<u8>,
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let subnet_auth = self.owners_auth(subnet_owners, from)?;
        let base = self.fee_only_base(self.fees.create_chain_tx_fee, from, change, memo)?;
        let tx = CreateChainTx::new(base, subnet_id, chain_name, vm_id, fx_ids, genesis_data, subnet_auth)?;
        Ok(self.finish(Transaction::CreateChain(tx)))
    }

    /// Add a validator to `subnet_id`, authorized by the subnet owners.
    pub fn add_subnet_validator_tx(
        &self,
        validator: Validator,
        subnet_id: Id,
        subnet_owners: &OutputOwners,
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let subnet_auth = self.owners_auth(subnet_owners, from)?;
        let base = self.fee_only_base(self.fees.tx_fee, from, change, memo)?;
        Ok(self.finish(Transaction::AddSubnetValidator(AddSubnetValidatorTx {
            base,
            validator: SubnetValidator { validator, subnet_id },
            subnet_auth,
        })))
    }

    /// Remove `node_id` from the validators of `subnet_id`.
    pub fn remove_subnet_validator_tx(
        &self,
        node_id: NodeId,
        subnet_id: Id,
        subnet_owners: &OutputOwners,
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let subnet_auth = self.owners_auth(subnet_owners, from)?;
        let base = self.fee_only_base(self.fees.tx_fee, from, change, memo)?;
        Ok(self.finish(Transaction::RemoveSubnetValidator(RemoveSubnetValidatorTx {
            base,
            node_id,
            subnet_id,
            subnet_auth,
        })))
    }

    /// Export `amount` of the native asset to `destination_chain`.
    pub fn export_tx(
        &self,
        destination_chain: Id,
        amount: u64,
        to: &[ShortId],
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let spend = self.spend(LockMode::Unlocked, amount, self.fees.tx_fee, to, from, change, true)?;
        let base = self.base(spend.inputs, spend.outputs, memo)?;
        let tx = ExportTx::new(base, destination_chain, spend.destination_outputs, self.codec);
        Ok(self.finish(Transaction::Export(tx)))
    }

    /// Import every unlocked UTXO in `atomic` that `from` can spend.
    ///
    /// The fee comes out of the imported native asset when there is enough
    /// of it, otherwise from this chain's UTXOs.
    pub fn import_tx(
        &self,
        source_chain: Id,
        atomic: &UtxoSet<Output>,
        to: &[ShortId],
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let mut imported_inputs = Vec::new();
        let mut totals: BTreeMap<Id, u64> = BTreeMap::new();
        for utxo in atomic.for_addresses(from) {
            if !utxo.lock_state().is_unlocked() || utxo.amount() == 0 {
                continue;
            }
            let Some(signers) = utxo.owners().select_signers(self.as_of, |a| from.contains(a)) else {
                continue;
            };
            let mut builder = InputBuilder::new(utxo.amount());
            for sig in signers {
                if let Some(source) = sig.source {
                    builder.add_signature_index(sig.index, source);
                }
            }
            imported_inputs.push(TransferableInput::new(
                utxo.tx_id,
                utxo.output_index,
                utxo.asset_id,
                builder.build::<Input>()?,
            ));
            let total = totals.entry(utxo.asset_id).or_insert(0);
            *total = total.checked_add(utxo.amount()).ok_or_else(|| {
                TransactionError::AmountOutOfRange(format!("imported {} overflows", utxo.asset_id))
            })?;
        }
        if imported_inputs.is_empty() {
            return Err(TransactionError::InsufficientFunds {
                asset_id: self.fee_asset_id,
                needed: 1,
                available: 0,
            });
        }

        let fee = self.fees.tx_fee;
        let mut base_inputs = Vec::new();
        let mut outputs = Vec::new();
        match totals.get_mut(&self.fee_asset_id) {
            Some(native) if *native >= fee => *native -= fee,
            _ if fee > 0 => {
                let spend = self.spend_fee(fee, from, change)?;
                base_inputs = spend.inputs;
                outputs = spend.outputs;
            }
            _ => {}
        }

        let owners = OutputOwners::new(0, 1, to.iter().copied())?;
        for (asset_id, amount) in totals {
            if amount > 0 {
                outputs.push(TransferableOutput::new(asset_id, Output::transfer(amount, owners.clone())));
            }
        }
        let base = self.base(base_inputs, outputs, memo)?;
        let tx = ImportTx::new(base, source_chain, imported_inputs);
        Ok(self.finish(Transaction::Import(tx)))
    }

    /// Link `new_node_id` to `consortium_member` in place of `old_node_id`.
    ///
    /// The member authorizes the change; when a new node is registered its
    /// node key signs last.
    pub fn register_node_tx(
        &self,
        old_node_id: NodeId,
        new_node_id: NodeId,
        consortium_member: ShortId,
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let base = self.fee_only_base(self.fees.tx_fee, from, change, memo)?;
        Ok(self.finish(Transaction::RegisterNode(RegisterNodeTx {
            base,
            old_node_id,
            new_node_id,
            consortium_member_auth: SubnetAuth::from_signers(&[(0, consortium_member)]),
            consortium_member_address: consortium_member,
        })))
    }

    /// Set or clear bit `state` of `address`.  Under codec 1 `executor`
    /// authorizes the change.
    #[allow(clippy::too_many_arguments)]
    pub fn address_state_tx(
        &self,
        address: ShortId,
        state: u8,
        remove: bool,
        executor: ShortId,
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let base = self.fee_only_base(self.fees.tx_fee, from, change, memo)?;
        let mut tx = AddressStateTx::new(base, address, state, remove)?;
        if type_ids::has_creator_auth(self.codec) {
            tx = tx.with_executor(executor, SubnetAuth::from_signers(&[(0, executor)]));
        }
        Ok(self.finish(Transaction::AddressState(tx)))
    }

    /// Claim rewards to `claim_to`; each claim is authorized by its owners.
    pub fn claim_tx(
        &self,
        claims: &[ClaimRequest],
        claim_to: &[ShortId],
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let claimables = claims
            .iter()
            .map(|c| {
                Ok(Claimable {
                    owner_id: c.owner_id,
                    claim_type: c.claim_type,
                    amount: c.amount,
                    auth: self.owners_auth(&c.owners, from)?,
                })
            })
            .collect::<Result<Vec<_>, TransactionError>>()?;
        let base = self.fee_only_base(self.fees.tx_fee, from, change, memo)?;
        Ok(self.finish(Transaction::Claim(ClaimTx {
            base,
            claimables,
            claim_to: OutputOwners::new(0, 1, claim_to.iter().copied())?,
        })))
    }

    /// Create an alias (zero `alias_id`) or update an existing one, which
    /// then authorizes the change.
    pub fn multisig_alias_tx(
        &self,
        alias_id: ShortId,
        alias_memo: &[u8],
        owners: OutputOwners,
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let alias = MultisigAlias::new(alias_id, alias_memo.to_vec(), owners)?;
        let auth = if alias_id == ShortId::ZERO {
            SubnetAuth::default()
        } else {
            SubnetAuth::from_signers(&[(0, alias_id)])
        };
        let base = self.fee_only_base(self.fees.tx_fee, from, change, memo)?;
        Ok(self.finish(Transaction::MultisigAlias(MultisigAliasTx { base, alias, auth })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_transaction::lock::THIS_TX_ID;
    use camino_transaction::{
        sign, AliasMap, CredentialVariant, InputVariant, KeyChain, KeyPair, MultisigKeyChain, UnsignedTransaction,
        Utxo,
    };

    use crate::inputs::Credential;
    use crate::outputs::{LockedOut, StakeableLockOut};

    fn native() -> Id {
        Id::new([0xaa; 32])
    }

    fn p_chain() -> Id {
        Id::new([0xbb; 32])
    }

    fn utxo(tx: u8, output: Output) -> Utxo<Output> {
        Utxo::new(Codec::V0, Id::new([tx; 32]), 0, native(), output)
    }

    fn fees() -> FeeSchedule {
        FeeSchedule {
            tx_fee: 10,
            add_validator_fee: 10,
            create_subnet_tx_fee: 100,
            create_chain_tx_fee: 200,
            ..FeeSchedule::default()
        }
    }

    fn key(b: u8) -> KeyPair {
        KeyPair::from_bytes(&[b; 32]).unwrap()
    }

    #[test]
    fn test_add_validator_stakes_locked_funds() {
        let me = key(1).address();
        let mut set = UtxoSet::new();
        set.add(utxo(
            1,
            Output::StakeableLock(StakeableLockOut {
                locktime: 1_000,
                output: camino_transaction::secp::SecpTransferOutput::new(2_000, OutputOwners::single(me)),
            }),
        ));
        set.add(utxo(2, Output::transfer(100, OutputOwners::single(me))));

        let builder = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees());
        let validator = Validator::new(NodeId::new([7; 20]), 10, 20, 2_000).unwrap();
        let unsigned = builder
            .add_validator_tx(validator, &[me], DelegationFee::from_percent(2).unwrap(), &[me], &[me], b"")
            .unwrap();
        let Transaction::AddValidator(tx) = &unsigned.tx else {
            panic!("expected add validator");
        };
        assert_eq!(tx.stake.len(), 1);
        assert_eq!(tx.stake[0].output.lock_state(), LockState::StakeableLocked { locktime: 1_000 });
        assert_eq!(tx.stake[0].output.amount(), 2_000);
        assert_eq!(tx.base.outputs.len(), 1);
        assert_eq!(tx.base.outputs[0].output.amount(), 90);
        assert_eq!(tx.base.inputs.len(), 2);
    }

    #[test]
    fn test_deposit_locks_to_this_tx() {
        let me = key(1).address();
        let creator = key(3).address();
        let mut set = UtxoSet::new();
        set.add(utxo(1, Output::transfer(1_000, OutputOwners::single(me))));

        let builder = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees()).codec(Codec::V1);
        let unsigned = builder
            .deposit_tx(Id::new([5; 32]), 86_400, 600, &[me], Some(creator), &[me], &[me], b"")
            .unwrap();
        let Transaction::Deposit(tx) = &unsigned.tx else {
            panic!("expected deposit");
        };
        let mut locks: Vec<(LockState, u64)> = tx
            .base
            .outputs
            .iter()
            .map(|o| (o.output.lock_state(), o.output.amount()))
            .collect();
        locks.sort();
        assert_eq!(
            locks,
            vec![
                (LockState::Unlocked, 390),
                (LockState::Locked(LockedIds::new(THIS_TX_ID, Id::ZERO)), 600),
            ]
        );
        let requirements = unsigned.credential_requirements();
        assert_eq!(requirements.len(), 2);
        assert_eq!(requirements[1].signers[0].source, Some(creator));
    }

    #[test]
    fn test_deposit_without_creator_under_codec_zero() {
        let me = key(1).address();
        let mut set = UtxoSet::new();
        set.add(utxo(1, Output::transfer(1_000, OutputOwners::single(me))));
        let builder = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees());
        let unsigned = builder
            .deposit_tx(Id::new([5; 32]), 86_400, 600, &[me], Some(key(3).address()), &[me], &[me], b"")
            .unwrap();
        assert_eq!(unsigned.credential_requirements().len(), 1);
        let bytes = unsigned.unsigned_bytes();
        let decoded = UnsignedTx::from_unsigned_bytes(&bytes).unwrap();
        assert_eq!(decoded.unsigned_bytes(), bytes);
        let Transaction::Deposit(tx) = &decoded.tx else {
            panic!("expected deposit");
        };
        assert_eq!(tx.deposit_creator, ShortId::ZERO);
    }

    #[test]
    fn test_camino_validator_bonds_deposited_funds() {
        let me = key(1).address();
        let deposit = Id::new([0xdd; 32]);
        let mut set = UtxoSet::new();
        set.add(utxo(
            1,
            Output::Locked(LockedOut {
                ids: LockedIds::new(deposit, Id::ZERO),
                output: camino_transaction::secp::SecpTransferOutput::new(500, OutputOwners::single(me)),
            }),
        ));
        set.add(utxo(2, Output::transfer(100, OutputOwners::single(me))));

        let builder = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees());
        let validator = Validator::new(NodeId::new([7; 20]), 10, 20, 500).unwrap();
        let unsigned = builder
            .camino_add_validator_tx(validator, me, &[me], DelegationFee::default(), &[me], &[me], b"")
            .unwrap();
        let Transaction::CaminoAddValidator(tx) = &unsigned.tx else {
            panic!("expected camino validator");
        };
        assert!(tx.stake.is_empty());
        assert!(tx
            .base
            .outputs
            .iter()
            .any(|o| o.output.lock_state() == LockState::Locked(LockedIds::new(deposit, THIS_TX_ID))));
        assert_eq!(unsigned.credential_requirements().len(), 3);
    }

    #[test]
    fn test_unlock_deposit_keeps_bond() {
        let me = key(1).address();
        let deposit = Id::new([0xdd; 32]);
        let bond = Id::new([0xee; 32]);
        let mut set = UtxoSet::new();
        set.add(utxo(
            1,
            Output::Locked(LockedOut {
                ids: LockedIds::new(deposit, bond),
                output: camino_transaction::secp::SecpTransferOutput::new(500, OutputOwners::single(me)),
            }),
        ));
        set.add(utxo(2, Output::transfer(100, OutputOwners::single(me))));

        let builder = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees());
        let unsigned = builder.unlock_deposit_tx(&[deposit], &[me], &[me], b"").unwrap();
        let base = unsigned.tx.base();
        assert_eq!(base.inputs.len(), 2);
        assert!(base
            .outputs
            .iter()
            .any(|o| o.output.lock_state() == LockState::Locked(LockedIds::new(Id::ZERO, bond))
                && o.output.amount() == 500));
        assert!(builder.unlock_deposit_tx(&[Id::new([1; 32])], &[me], &[me], b"").is_err());
    }

    #[test]
    fn test_create_chain_needs_subnet_signers() {
        let me = key(1).address();
        let other = key(2).address();
        let mut set = UtxoSet::new();
        set.add(utxo(1, Output::transfer(1_000, OutputOwners::single(me))));
        let builder = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees());

        let subnet_owners = OutputOwners::new(0, 1, [me, other]).unwrap();
        let unsigned = builder
            .create_chain_tx(Id::new([4; 32]), &subnet_owners, "chain", Id::new([6; 32]), vec![], vec![], &[me], &[me], b"")
            .unwrap();
        let requirements = unsigned.credential_requirements();
        assert_eq!(requirements.len(), 2);
        assert_eq!(requirements[1].signers[0].source, Some(me));
        assert_eq!(unsigned.tx.base().outputs[0].output.amount(), 800);

        let foreign = OutputOwners::single(other);
        assert!(matches!(
            builder.create_chain_tx(Id::ZERO, &foreign, "chain", Id::ZERO, vec![], vec![], &[me], &[me], b""),
            Err(TransactionError::InvalidOwners(_))
        ));
    }

    #[test]
    fn test_register_node_signed_with_alias() {
        let payer = key(1);
        let owner_a = key(2);
        let owner_b = key(3);
        let node = key(4);
        let alias = ShortId::new([0x5a; 20]);
        let me = payer.address();

        let mut set = UtxoSet::new();
        set.add(utxo(1, Output::transfer(100, OutputOwners::single(me))));
        let mut aliases = AliasMap::new();
        aliases.insert(alias, OutputOwners::new(0, 2, [owner_a.address(), owner_b.address()]).unwrap());

        let node_id = NodeId::new(*node.address().as_bytes());
        let builder = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees());
        let unsigned = builder
            .register_node_tx(NodeId::default(), node_id, alias, &[me], &[me], b"")
            .unwrap();

        let mut keys = KeyChain::new();
        keys.add(payer);
        keys.add(owner_a);
        keys.add(owner_b);
        keys.add(node);
        let signer = MultisigKeyChain::new(&keys, &aliases);
        let signed = sign(unsigned, &signer).unwrap();
        assert_eq!(signed.credentials.len(), 3);
        assert!(matches!(signed.credentials[0], Credential::Secp(_)));
        assert!(matches!(signed.credentials[1], Credential::Multisig(_)));
        assert_eq!(signed.credentials[1].signatures().len(), 2);
        assert!(matches!(signed.credentials[2], Credential::Secp(_)));
        assert!(signed.is_fully_signed());
    }

    #[test]
    fn test_address_state_executor_only_under_codec_one() {
        let me = key(1).address();
        let mut set = UtxoSet::new();
        set.add(utxo(1, Output::transfer(100, OutputOwners::single(me))));
        let target = key(5).address();

        let v0 = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees());
        let unsigned = v0.address_state_tx(target, 32, false, me, &[me], &[me], b"").unwrap();
        assert_eq!(unsigned.credential_requirements().len(), 1);

        let v1 = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees()).codec(Codec::V1);
        let unsigned = v1.address_state_tx(target, 32, false, me, &[me], &[me], b"").unwrap();
        assert_eq!(unsigned.credential_requirements().len(), 2);
        assert!(v1.address_state_tx(target, 64, false, me, &[me], &[me], b"").is_err());
    }

    #[test]
    fn test_claim_authorized_per_claimable() {
        let me = key(1).address();
        let mut set = UtxoSet::new();
        set.add(utxo(1, Output::transfer(100, OutputOwners::single(me))));
        let builder = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees());
        let claims = vec![
            ClaimRequest {
                owner_id: Id::new([1; 32]),
                claim_type: ClaimType::ValidatorReward,
                amount: 5,
                owners: OutputOwners::single(me),
            },
            ClaimRequest {
                owner_id: Id::new([2; 32]),
                claim_type: ClaimType::ActiveDepositReward,
                amount: 7,
                owners: OutputOwners::single(me),
            },
        ];
        let unsigned = builder.claim_tx(&claims, &[me], &[me], &[me], b"").unwrap();
        assert_eq!(unsigned.credential_requirements().len(), 3);
    }

    #[test]
    fn test_import_then_export() {
        let key = key(1);
        let me = key.address();
        let mut atomic = UtxoSet::new();
        atomic.add(utxo(9, Output::transfer(500, OutputOwners::single(me))));
        let empty = UtxoSet::new();
        let builder = TxBuilder::new(12345, p_chain(), native(), &empty).fees(fees());
        let unsigned = builder.import_tx(Id::new([3; 32]), &atomic, &[me], &[me], &[me], b"").unwrap();
        assert_eq!(unsigned.tx.base().outputs[0].output.amount(), 490);

        let mut keys = KeyChain::new();
        keys.add(key);
        let signed = sign(unsigned, &keys).unwrap();
        assert_eq!(signed.credentials.len(), 1);

        let mut set = UtxoSet::new();
        set.add(utxo(1, Output::transfer(1_000, OutputOwners::single(me))));
        let builder = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees());
        let unsigned = builder.export_tx(Id::new([3; 32]), 300, &[me], &[me], &[me], b"").unwrap();
        let Transaction::Export(tx) = &unsigned.tx else {
            panic!("expected export");
        };
        assert_eq!(tx.exported_outputs[0].output.amount(), 300);
        assert_eq!(tx.base.outputs[0].output.amount(), 690);
    }

    #[test]
    fn test_from_config_requires_native_asset() {
        let set = UtxoSet::new();
        let mut config = NetworkConfig::local();
        config.native_asset_id = None;
        assert!(TxBuilder::from_config(&config, &set).is_err());
        config.native_asset_id = Some(native());
        assert!(TxBuilder::from_config(&config, &set).is_ok());
    }

    #[test]
    fn test_create_subnet_and_alias() {
        let me = key(1).address();
        let mut set = UtxoSet::new();
        set.add(utxo(1, Output::transfer(1_000, OutputOwners::single(me))));
        let builder = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees());
        let unsigned = builder.create_subnet_tx(&[me], 1, &[me], &[me], b"").unwrap();
        assert_eq!(unsigned.tx.base().outputs[0].output.amount(), 900);

        let owners = OutputOwners::new(0, 1, [me, key(2).address()]).unwrap();
        let created = builder
            .multisig_alias_tx(ShortId::ZERO, b"team", owners.clone(), &[me], &[me], b"")
            .unwrap();
        assert_eq!(created.credential_requirements().len(), 2);
        assert!(created.credential_requirements()[1].signers.is_empty());
        let updated = builder
            .multisig_alias_tx(ShortId::new([0x5a; 20]), b"team", owners, &[me], &[me], b"")
            .unwrap();
        assert_eq!(updated.credential_requirements()[1].signers.len(), 1);
    }

    #[test]
    fn test_built_transactions_decode_equal() {
        let me = key(1).address();
        let mut set = UtxoSet::new();
        set.add(utxo(1, Output::transfer(1_000, OutputOwners::single(me))));
        set.add(utxo(2, Output::transfer(400, OutputOwners::single(me))));
        let builder = TxBuilder::new(12345, p_chain(), native(), &set).fees(fees()).codec(Codec::V1);

        let base = builder.base_tx(700, &[key(2).address()], &[me], &[me], b"").unwrap();
        let deposit = builder
            .deposit_tx(Id::new([5; 32]), 86_400, 600, &[me], Some(key(3).address()), &[me], &[me], b"")
            .unwrap();
        for unsigned in [base, deposit] {
            assert!(unsigned.tx.base().inputs[0].input.sig_indices()[0].source.is_some());
            let decoded = UnsignedTx::from_unsigned_bytes(&unsigned.unsigned_bytes()).unwrap();
            assert_eq!(decoded, unsigned);
        }
    }
}
