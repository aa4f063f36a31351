use proptest::prelude::*;

use camino_avm::{ExportTx, Output, Transaction, TxBuilder, UnsignedTx};
use camino_primitives::network::FeeSchedule;
use camino_primitives::{Id, ShortId};
use camino_transaction::secp::SecpTransferInput;
use camino_transaction::{
    BaseTx, Codec, InputVariant, OutputOwners, OutputVariant, SigIdx, TransactionError,
    TransferableInput, TransferableOutput, UnsignedTransaction, Utxo, UtxoSet,
};

fn arb_short_id() -> impl Strategy<Value = ShortId> {
    prop::array::uniform20(any::<u8>()).prop_map(ShortId::new)
}

fn arb_id() -> impl Strategy<Value = Id> {
    prop::array::uniform32(any::<u8>()).prop_map(Id::new)
}

fn arb_codec() -> impl Strategy<Value = Codec> {
    prop_oneof![Just(Codec::V0), Just(Codec::V1)]
}

fn arb_output() -> impl Strategy<Value = TransferableOutput<Output>> {
    (arb_id(), any::<u64>(), arb_short_id())
        .prop_map(|(asset, amount, owner)| TransferableOutput::new(asset, Output::transfer(amount, OutputOwners::single(owner))))
}

fn arb_input() -> impl Strategy<Value = TransferableInput<camino_avm::Input>> {
    (arb_id(), any::<u32>(), arb_id(), any::<u64>(), prop::collection::vec(any::<u32>(), 0..4)).prop_map(
        |(tx, index, asset, amount, sigs)| {
            let sigs = sigs.into_iter().map(SigIdx::new).collect();
            TransferableInput::new(tx, index, asset, camino_avm::Input::SecpTransfer(SecpTransferInput::new(amount, sigs)))
        },
    )
}

fn arb_export() -> impl Strategy<Value = ExportTx> {
    (
        any::<u32>(),
        arb_id(),
        prop::collection::vec(arb_input(), 0..4),
        prop::collection::vec(arb_output(), 0..4),
        prop::collection::vec(any::<u8>(), 0..64),
        arb_id(),
        prop::collection::vec(arb_output(), 0..4),
        arb_codec(),
    )
        .prop_map(|(network, chain, inputs, outputs, memo, dest, exported, codec)| {
            let mut base = BaseTx::new(network, chain).with_memo(memo).unwrap();
            base.inputs = inputs;
            base.outputs = outputs;
            ExportTx::new(base, dest, exported, codec)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Export transactions survive the unsigned encoding under either codec.
    #[test]
    fn prop_export_roundtrip(tx in arb_export(), codec in arb_codec()) {
        let unsigned = UnsignedTx::new(codec, Transaction::Export(tx));
        let bytes = unsigned.unsigned_bytes();
        let decoded = UnsignedTx::from_unsigned_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded.unsigned_bytes(), bytes);
        prop_assert_eq!(decoded.tx.base().inputs.len(), unsigned.tx.base().inputs.len());
    }

    /// Any strict prefix of an encoded transaction is rejected.
    #[test]
    fn prop_truncated_rejected(tx in arb_export(), cut in any::<prop::sample::Index>()) {
        let bytes = UnsignedTx::new(Codec::V0, Transaction::Export(tx)).unsigned_bytes();
        let end = cut.index(bytes.len());
        prop_assert!(UnsignedTx::from_unsigned_bytes(&bytes[..end]).is_err());
    }

    /// Built base transactions conserve value: inputs cover outputs plus the fee.
    #[test]
    fn prop_base_tx_conserves_value(
        amounts in prop::collection::vec(1u64..1_000_000, 1..8),
        send in 1u64..2_000_000,
        fee in 0u64..1_000,
    ) {
        let me = ShortId::new([1; 20]);
        let them = ShortId::new([2; 20]);
        let asset = Id::new([0xaa; 32]);
        let mut set = UtxoSet::new();
        for (i, amount) in amounts.iter().enumerate() {
            set.add(Utxo::new(Codec::V0, Id::new([i as u8 + 1; 32]), 0, asset, Output::transfer(*amount, OutputOwners::single(me))));
        }
        let fees = FeeSchedule { tx_fee: fee, ..FeeSchedule::default() };
        let builder = TxBuilder::new(12345, Id::new([0xcc; 32]), asset, &set).fees(fees);
        let total: u64 = amounts.iter().sum();

        match builder.base_tx(asset, send, &[them], &[me], &[me], b"") {
            Ok(unsigned) => {
                let base = unsigned.tx.base();
                let spent: u64 = base.inputs.iter().map(|i| i.input.amount()).sum();
                let produced: u64 = base.outputs.iter().map(|o| o.output.amount()).sum();
                prop_assert_eq!(spent, produced + fee);
                let sent: u64 = base
                    .outputs
                    .iter()
                    .filter(|o| o.output.owners().contains(&them))
                    .map(|o| o.output.amount())
                    .sum();
                prop_assert_eq!(sent, send);
            }
            Err(TransactionError::InsufficientFunds { needed, available, .. }) => {
                prop_assert!(total < send + fee);
                prop_assert_eq!(needed, send + fee);
                prop_assert_eq!(available, total);
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }
}
