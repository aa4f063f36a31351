//! High-level transaction builders over a UTXO snapshot.
//!
//! Each builder plans spends with [`Spender`], pays the flat fee from the
//! fee asset, and returns an [`UnsignedTx`] with sorted inputs and outputs.

use std::collections::BTreeMap;

use camino_primitives::network::{FeeSchedule, NetworkConfig};
use camino_primitives::{Id, PrimitivesError, ShortId};
use camino_transaction::secp::SecpTransferOutput;
use camino_transaction::transferable::{sort_inputs, sort_outputs};
use camino_transaction::{
    AssetAmountDestination, Codec, InputBuilder, OutputOwners, Spend, Spender, TransactionError,
    TransferableInput, TransferableOutput, UtxoId, UtxoSet,
};
use tracing::debug;

use crate::inputs::Input;
use crate::operations::{Operation, SecpMintOperation, TransferableOperation};
use crate::outputs::{Output, SecpMintOutput};
use crate::txs::{BaseTx, CreateAssetTx, ExportTx, ImportTx, InitialState, OperationTx, Transaction};
use crate::unsigned::UnsignedTx;

/// Builds asset chain transactions for one network and chain.
pub struct TxBuilder<'a> {
    network_id: u32,
    blockchain_id: Id,
    fee_asset_id: Id,
    fees: FeeSchedule,
    codec: Codec,
    as_of: u64,
    utxos: &'a UtxoSet<Output>,
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
        }
    }

    /// Take network ID, chain ID, fee asset and fees from `config`.
    ///
    /// Fails if the config does not name the asset chain or native asset.
    pub fn from_config(config: &NetworkConfig, utxos: &'a UtxoSet<Output>) -> Result<Self, TransactionError> {
        let blockchain_id = config.x_chain_id.ok_or_else(|| {
            PrimitivesError::InvalidConfig("asset chain id is not set".to_string())
        })?;
        let fee_asset_id = config.native_asset_id.ok_or_else(|| {
            PrimitivesError::InvalidConfig("native asset id is not set".to_string())
        })?;
        Ok(Self::new(config.network_id, blockchain_id, fee_asset_id, utxos).fees(config.fees))
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

    fn spender(&self) -> Spender<'a, Output> {
        Spender::new(self.utxos).as_of(self.as_of).codec(self.codec)
    }

    fn destination(
        &self,
        asset_id: Id,
        amount: u64,
        burn: u64,
        to: &[ShortId],
        from: &[ShortId],
        change: &[ShortId],
    ) -> Result<AssetAmountDestination, TransactionError> {
        let mut aad = AssetAmountDestination::new(from.to_vec(), to.to_vec(), change.to_vec());
        aad.add_amount(asset_id, amount, burn)?;
        Ok(aad)
    }

    /// Spend `amount` of `asset_id` plus `fee` of the fee asset.
    fn spend_with_fee(
        &self,
        asset_id: Id,
        amount: u64,
        fee: u64,
        to: &[ShortId],
        from: &[ShortId],
        change: &[ShortId],
        split: bool,
    ) -> Result<Spend<Input, Output>, TransactionError> {
        let spender = self.spender().split_destination(split);
        if asset_id == self.fee_asset_id {
            return spender.spend(&self.destination(asset_id, amount, fee, to, from, change)?);
        }
        let mut spend = spender.spend::<Input>(&self.destination(asset_id, amount, 0, to, from, change)?)?;
        if fee > 0 {
            let fee_spend =
                spender.spend::<Input>(&self.destination(self.fee_asset_id, 0, fee, to, from, change)?)?;
            spend.inputs.extend(fee_spend.inputs);
            spend.outputs.extend(fee_spend.outputs);
            spend.burned = fee_spend.burned;
            sort_inputs(&mut spend.inputs);
            sort_outputs(&mut spend.outputs, self.codec);
        }
        Ok(spend)
    }

    /// Pay only the fee.
    fn spend_fee(&self, fee: u64, from: &[ShortId], change: &[ShortId]) -> Result<Spend<Input, Output>, TransactionError> {
        self.spend_with_fee(self.fee_asset_id, 0, fee, &[], from, change, false)
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

    fn finish(&self, tx: Transaction) -> UnsignedTx {
        let base = tx.base();
        debug!(
            chain = %self.blockchain_id,
            inputs = base.inputs.len(),
            outputs = base.outputs.len(),
            "asset chain transaction built"
        );
        UnsignedTx::new(self.codec, tx)
    }

    /// Send `amount` of `asset_id` to `to` (threshold 1).
    pub fn base_tx(
        &self,
        asset_id: Id,
        amount: u64,
        to: &[ShortId],
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let spend = self.spend_with_fee(asset_id, amount, self.fees.tx_fee, to, from, change, false)?;
        let base = self.base(spend.inputs, spend.outputs, memo)?;
        Ok(self.finish(Transaction::Base(base)))
    }

    /// Create an asset with the given initial outputs.
    pub fn create_asset_tx(
        &self,
        name: &str,
        symbol: &str,
        denomination: u8,
        initial_states: Vec<InitialState>,
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let spend = self.spend_fee(self.fees.create_asset_tx_fee, from, change)?;
        let base = self.base(spend.inputs, spend.outputs, memo)?;
        let tx = CreateAssetTx::new(base, name, symbol, denomination, initial_states)?;
        Ok(self.finish(Transaction::CreateAsset(tx)))
    }

    /// Export `amount` of `asset_id` to `destination_chain`, owned by `to`.
    pub fn export_tx(
        &self,
        destination_chain: Id,
        asset_id: Id,
        amount: u64,
        to: &[ShortId],
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let spend = self.spend_with_fee(asset_id, amount, self.fees.tx_fee, to, from, change, true)?;
        let base = self.base(spend.inputs, spend.outputs, memo)?;
        let tx = ExportTx::new(base, destination_chain, spend.destination_outputs, self.codec);
        Ok(self.finish(Transaction::Export(tx)))
    }

    /// Import every UTXO in `atomic` that `from` can spend and send it to `to`.
    ///
    /// The fee comes out of the imported fee asset when there is enough of
    /// it, otherwise from this chain's UTXOs.
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
            if !matches!(utxo.output, Output::SecpTransfer(_)) || utxo.amount() == 0 {
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
        sort_inputs(&mut imported_inputs);

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
        Ok(self.finish(Transaction::Import(ImportTx {
            base,
            source_chain,
            imported_inputs,
        })))
    }

    /// Mint `amount` of a variable-cap asset to `to` with a mint output
    /// that `from` controls.  The mint output is re-issued unchanged.
    pub fn mint_tx(
        &self,
        asset_id: Id,
        amount: u64,
        to: &[ShortId],
        from: &[ShortId],
        change: &[ShortId],
        memo: &[u8],
    ) -> Result<UnsignedTx, TransactionError> {
        let (utxo, signers) = self
            .utxos
            .for_addresses(from)
            .into_iter()
            .filter(|u| u.asset_id == asset_id && matches!(u.output, Output::SecpMint(_)))
            .find_map(|u| {
                u.owners()
                    .select_signers(self.as_of, |a| from.contains(a))
                    .map(|s| (u, s))
            })
            .ok_or_else(|| {
                TransactionError::InvalidOwners(format!("no mint output for {} signable by sender", asset_id))
            })?;

        let mut builder = InputBuilder::new(0);
        for sig in signers {
            if let Some(source) = sig.source {
                builder.add_signature_index(sig.index, source);
            }
        }
        let operation = Operation::SecpMint(SecpMintOperation {
            sig_indices: builder.sig_indices().to_vec(),
            mint_output: SecpMintOutput::new(utxo.owners().clone()),
            transfer_output: SecpTransferOutput::new(amount, OutputOwners::new(0, 1, to.iter().copied())?),
        });
        let op = TransferableOperation::new(asset_id, vec![UtxoId::new(utxo.tx_id, utxo.output_index)], operation);

        let spend = self.spend_fee(self.fees.tx_fee, from, change)?;
        let base = self.base(spend.inputs, spend.outputs, memo)?;
        Ok(self.finish(Transaction::Operation(OperationTx {
            base,
            operations: vec![op],
        })))
    }
}
