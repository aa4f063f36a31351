//! Builders for EVM chain atomic transactions.
//!
//! The fee is always paid in the native asset: imports deduct it from the
//! imported native value, exports debit it from the sending account on
//! top of the exported amount.

use std::collections::BTreeMap;

use camino_primitives::network::NetworkConfig;
use camino_primitives::{Id, PrimitivesError, ShortId};
use camino_transaction::{
    InputBuilder, OutputOwners, TransactionError, TransferableInput, TransferableOutput, UtxoSet,
};
use tracing::debug;

use crate::address::EthAddress;
use crate::entities::{Input, Output};
use crate::evm::{EvmInput, EvmOutput};
use crate::fee::{estimate_gas, fee_for_gas};
use crate::txs::{ExportTx, ImportTx, Transaction};
use crate::unsigned::UnsignedTx;

/// Builds atomic transactions for one EVM chain.
pub struct TxBuilder {
    network_id: u32,
    blockchain_id: Id,
    fee_asset_id: Id,
    fee: u64,
    as_of: u64,
}

impl TxBuilder {
    pub fn new(network_id: u32, blockchain_id: Id, fee_asset_id: Id) -> Self {
        TxBuilder {
            network_id,
            blockchain_id,
            fee_asset_id,
            fee: 0,
            as_of: 0,
        }
    }

    /// Take network ID, EVM chain ID, fee asset and flat fee from `config`.
    pub fn from_config(config: &NetworkConfig) -> Result<Self, TransactionError> {
        let blockchain_id = config
            .c_chain_id
            .ok_or_else(|| PrimitivesError::InvalidConfig("evm chain id is not set".to_string()))?;
        let fee_asset_id = config
            .native_asset_id
            .ok_or_else(|| PrimitivesError::InvalidConfig("native asset id is not set".to_string()))?;
        Ok(Self::new(config.network_id, blockchain_id, fee_asset_id).fee(config.fees.tx_fee))
    }

    /// Flat fee in native units.
    pub fn fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    /// Time at which locktimes of imported UTXOs are evaluated.
    pub fn as_of(mut self, as_of: u64) -> Self {
        self.as_of = as_of;
        self
    }

    /// Set the fee to what `build` costs at `base_fee` wei per gas.
    ///
    /// `build` is called once with the current fee to measure the
    /// transaction.
    pub fn dynamic_fee<F>(self, base_fee: u128, build: F) -> Result<Self, TransactionError>
    where
        F: FnOnce(&TxBuilder) -> Result<UnsignedTx, TransactionError>,
    {
        let gas = estimate_gas(&build(&self)?)?;
        let fee = fee_for_gas(gas, base_fee)?;
        debug!(gas, base_fee = %base_fee, fee, "atomic transaction fee");
        Ok(self.fee(fee))
    }

    /// Credit every unlocked UTXO in `atomic` that `from` can spend to
    /// the account `to`, one output per asset.
    pub fn import_tx(
        &self,
        source_chain: Id,
        atomic: &UtxoSet<Output>,
        to: EthAddress,
        from: &[ShortId],
    ) -> Result<UnsignedTx, TransactionError> {
        let mut imported_inputs = Vec::new();
        let mut totals: BTreeMap<Id, u64> = BTreeMap::new();
        for utxo in atomic.for_addresses(from) {
            if utxo.amount() == 0 {
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

        let native = totals.get(&self.fee_asset_id).copied().unwrap_or(0);
        if imported_inputs.is_empty() || native < self.fee {
            return Err(TransactionError::InsufficientFunds {
                asset_id: self.fee_asset_id,
                needed: self.fee.max(1),
                available: native,
            });
        }
        totals.insert(self.fee_asset_id, native - self.fee);

        let outputs = totals
            .into_iter()
            .filter(|(_, amount)| *amount > 0)
            .map(|(asset_id, amount)| EvmOutput::new(to, amount, asset_id))
            .collect();
        let tx = ImportTx::new(self.network_id, self.blockchain_id, source_chain, imported_inputs, outputs);
        debug!(
            chain = %self.blockchain_id,
            source = %source_chain,
            inputs = tx.imported_inputs.len(),
            outputs = tx.outputs.len(),
            "atomic import built"
        );
        Ok(UnsignedTx::new(Transaction::Import(tx)))
    }

    /// Debit `amount` of `asset_id` plus the fee from `from` at `nonce`
    /// and export it to `to` on `destination_chain`.
    pub fn export_tx(
        &self,
        destination_chain: Id,
        asset_id: Id,
        amount: u64,
        from: EthAddress,
        nonce: u64,
        to: &[ShortId],
    ) -> Result<UnsignedTx, TransactionError> {
        if amount == 0 {
            return Err(TransactionError::AmountOutOfRange("export amount is zero".to_string()));
        }
        let inputs = if asset_id == self.fee_asset_id {
            let debit = amount
                .checked_add(self.fee)
                .ok_or_else(|| TransactionError::AmountOutOfRange(format!("{} plus fee {}", amount, self.fee)))?;
            vec![EvmInput::new(from, debit, asset_id, nonce)]
        } else {
            let mut inputs = vec![EvmInput::new(from, amount, asset_id, nonce)];
            if self.fee > 0 {
                inputs.push(EvmInput::new(from, self.fee, self.fee_asset_id, nonce));
            }
            inputs
        };
        let owners = OutputOwners::new(0, 1, to.iter().copied())?;
        let exported = vec![TransferableOutput::new(asset_id, Output::transfer(amount, owners))];
        let tx = ExportTx::new(self.network_id, self.blockchain_id, destination_chain, inputs, exported);
        debug!(
            chain = %self.blockchain_id,
            destination = %destination_chain,
            from = %from,
            nonce,
            "atomic export built"
        );
        Ok(UnsignedTx::new(Transaction::Export(tx)))
    }
}
