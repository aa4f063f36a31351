//! Tests for the camino-transaction crate.
//!
//! A minimal single-variant chain (one output, one input, SECP and multisig
//! credentials, one base transaction) exercises the spend and signing
//! engines independently of the chain crates.

use camino_primitives::ec::Signature;
use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::{Id, ShortId};

use crate::base_tx::BaseTx;
use crate::codec::{Codec, Domain, Encodable, ReadExt, Variant};
use crate::entity::{CredentialVariant, InputVariant, OutputVariant};
use crate::keychain::{KeyChain, KeyPair};
use crate::lock::{LockMode, LockState};
use crate::multisig::{AliasMap, MultisigKeyChain};
use crate::owners::OutputOwners;
use crate::secp::{
    MultisigCredential, SecpCredential, SecpTransferInput, SecpTransferOutput, SigIdx,
};
use crate::sign::{
    is_placeholder, sign, sign_partial, CredentialRequirement, SignedTx, UnsignedTransaction,
};
use crate::spend::{AssetAmountDestination, Spender};
use crate::transferable::{inputs_sorted_unique, outputs_sorted, TransferableOutput};
use crate::utxo::Utxo;
use crate::utxo_set::UtxoSet;
use crate::TransactionError;

// -----------------------------------------------------------------------
// A minimal chain
// -----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Out {
    Transfer(SecpTransferOutput),
}

impl Variant for Out {
    const DOMAIN: Domain = Domain::Output;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        match type_id {
            7 => Ok(Out::Transfer(SecpTransferOutput::default())),
            other => Err(Self::unknown(other)),
        }
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        7
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        let Out::Transfer(o) = self;
        o.write_to(writer, codec);
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        let Out::Transfer(o) = self;
        *o = SecpTransferOutput::read_from(reader, codec)?;
        Ok(())
    }
}

impl OutputVariant for Out {
    fn amount(&self) -> u64 {
        let Out::Transfer(o) = self;
        o.amount
    }

    fn owners(&self) -> &OutputOwners {
        let Out::Transfer(o) = self;
        &o.owners
    }

    fn locked(amount: u64, owners: OutputOwners, lock: &LockState) -> Result<Self, TransactionError> {
        match lock {
            LockState::Unlocked => Ok(Out::Transfer(SecpTransferOutput::new(amount, owners))),
            other => Err(TransactionError::UnsupportedLock(format!("{:?}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum In {
    Transfer(SecpTransferInput),
}

impl Variant for In {
    const DOMAIN: Domain = Domain::Input;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        match type_id {
            5 => Ok(In::Transfer(SecpTransferInput::default())),
            other => Err(Self::unknown(other)),
        }
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        5
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        let In::Transfer(i) = self;
        i.write_to(writer, codec);
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        let In::Transfer(i) = self;
        *i = SecpTransferInput::read_from(reader, codec)?;
        Ok(())
    }
}

impl InputVariant for In {
    type Credential = Cred;

    fn amount(&self) -> u64 {
        let In::Transfer(i) = self;
        i.amount
    }

    fn sig_indices(&self) -> &[SigIdx] {
        let In::Transfer(i) = self;
        &i.sig_indices
    }

    fn sig_indices_mut(&mut self) -> &mut Vec<SigIdx> {
        let In::Transfer(i) = self;
        &mut i.sig_indices
    }

    fn credential(&self) -> Cred {
        Cred::Secp(SecpCredential::default())
    }

    fn spending(amount: u64, sig_indices: Vec<SigIdx>, lock: &LockState) -> Result<Self, TransactionError> {
        match lock {
            LockState::Unlocked => Ok(In::Transfer(SecpTransferInput::new(amount, sig_indices))),
            other => Err(TransactionError::UnsupportedLock(format!("{:?}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cred {
    Secp(SecpCredential),
    Multisig(MultisigCredential),
}

impl Variant for Cred {
    const DOMAIN: Domain = Domain::Credential;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        match type_id {
            9 => Ok(Cred::Secp(SecpCredential::default())),
            10 => Ok(Cred::Multisig(MultisigCredential::default())),
            other => Err(Self::unknown(other)),
        }
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        match self {
            Cred::Secp(_) => 9,
            Cred::Multisig(_) => 10,
        }
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        match self {
            Cred::Secp(c) => c.write_to(writer, codec),
            Cred::Multisig(c) => c.write_to(writer, codec),
        }
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        match self {
            Cred::Secp(c) => *c = SecpCredential::read_from(reader, codec)?,
            Cred::Multisig(c) => *c = MultisigCredential::read_from(reader, codec)?,
        }
        Ok(())
    }
}

impl CredentialVariant for Cred {
    fn signatures(&self) -> &[Signature] {
        match self {
            Cred::Secp(c) => &c.signatures,
            Cred::Multisig(c) => &c.signatures,
        }
    }

    fn signatures_mut(&mut self) -> &mut Vec<Signature> {
        match self {
            Cred::Secp(c) => &mut c.signatures,
            Cred::Multisig(c) => &mut c.signatures,
        }
    }

    fn to_multisig(&self) -> Option<Self> {
        Some(Cred::Multisig(MultisigCredential::default()))
    }

    fn as_multisig_mut(&mut self) -> Option<&mut MultisigCredential> {
        match self {
            Cred::Multisig(c) => Some(c),
            Cred::Secp(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tx {
    codec: Codec,
    base: BaseTx<In, Out>,
}

impl UnsignedTransaction for Tx {
    type Credential = Cred;

    fn codec(&self) -> Codec {
        self.codec
    }

    fn write_tx(&self, writer: &mut ByteWriter) {
        self.codec.write_to(writer);
        writer.write_u32_be(0);
        self.base.write_to(writer, self.codec);
    }

    fn read_tx(reader: &mut ByteReader<'_>) -> Result<Self, TransactionError> {
        let codec = Codec::read_from(reader)?;
        let type_id = reader.read_u32_be().reading("tx type id")?;
        if type_id != 0 {
            return Err(TransactionError::UnknownTypeId {
                domain: Domain::Transaction,
                type_id,
            });
        }
        let base = BaseTx::read_from(reader, codec)?;
        Ok(Tx { codec, base })
    }

    fn credential_requirements(&self) -> Vec<CredentialRequirement<Cred>> {
        self.base
            .inputs
            .iter()
            .map(|i| CredentialRequirement::new(i.input.credential(), i.input.sig_indices().to_vec()))
            .collect()
    }
}

// -----------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------

const NETWORK_ID: u32 = 12345;

fn asset() -> Id {
    Id::new([0xa0; 32])
}

fn other_asset() -> Id {
    Id::new([0xb0; 32])
}

fn key(b: u8) -> KeyPair {
    KeyPair::from_bytes(&[b; 32]).unwrap()
}

fn utxo(tx: u8, index: u32, asset_id: Id, amount: u64, owners: OutputOwners) -> Utxo<Out> {
    Utxo::new(
        Codec::V0,
        Id::new([tx; 32]),
        index,
        asset_id,
        Out::Transfer(SecpTransferOutput::new(amount, owners)),
    )
}

fn build_tx(spend: crate::spend::Spend<In, Out>, memo: &[u8]) -> Tx {
    let mut base = BaseTx::new(NETWORK_ID, Id::ZERO).with_memo(memo.to_vec()).unwrap();
    base.inputs = spend.inputs;
    base.outputs = spend.outputs;
    Tx {
        codec: Codec::V0,
        base,
    }
}

fn recovered_signers(tx: &Tx, credential: &Cred) -> Vec<ShortId> {
    let digest = tx.hash();
    credential
        .signatures()
        .iter()
        .map(|s| KeyPair::recover(&digest, s).unwrap().address())
        .collect()
}

// -----------------------------------------------------------------------
// Spend engine
// -----------------------------------------------------------------------

#[test]
fn test_simple_transfer() {
    let sender = key(1).address();
    let receiver = key(2).address();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 1000, OutputOwners::single(sender)));

    let mut aad = AssetAmountDestination::new(vec![sender], vec![receiver], vec![sender]);
    aad.add_amount(asset(), 700, 10).unwrap();
    let spend = Spender::new(&set).spend::<In>(&aad).unwrap();

    assert_eq!(spend.inputs.len(), 1);
    assert_eq!(spend.inputs[0].input.amount(), 1000);
    assert_eq!(spend.inputs[0].input.sig_indices(), &[SigIdx::with_source(0, sender)]);
    assert_eq!(spend.inputs[0].input.sig_indices()[0].source, Some(sender));
    assert_eq!(spend.input_owners, vec![OutputOwners::single(sender)]);

    assert_eq!(spend.outputs.len(), 2);
    assert_eq!(spend.outputs[0].output.amount(), 290);
    assert_eq!(spend.outputs[0].output.owners(), &OutputOwners::single(sender));
    assert_eq!(spend.outputs[1].output.amount(), 700);
    assert_eq!(spend.outputs[1].output.owners(), &OutputOwners::single(receiver));
    assert!(spend.destination_outputs.is_empty());
    assert_eq!(spend.burned, 10);
    assert_eq!(1000, 700 + 290 + 10);
    assert!(outputs_sorted(&spend.outputs, Codec::V0));
}

#[test]
fn test_exact_amount_has_no_change() {
    let sender = key(1).address();
    let receiver = key(2).address();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 110, OutputOwners::single(sender)));

    let mut aad = AssetAmountDestination::new(vec![sender], vec![receiver], vec![sender]);
    aad.add_amount(asset(), 100, 10).unwrap();
    let spend = Spender::new(&set).spend::<In>(&aad).unwrap();
    assert_eq!(spend.outputs.len(), 1);
    assert_eq!(spend.outputs[0].output.amount(), 100);
}

#[test]
fn test_insufficient_funds() {
    let sender = key(1).address();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 30, OutputOwners::single(sender)));
    set.add(utxo(2, 0, asset(), 20, OutputOwners::single(sender)));

    let mut aad = AssetAmountDestination::new(vec![sender], vec![key(2).address()], vec![sender]);
    aad.add_amount(asset(), 100, 0).unwrap();
    let err = Spender::new(&set).spend::<In>(&aad).unwrap_err();
    assert!(err.is_recoverable());
    match err {
        TransactionError::InsufficientFunds {
            asset_id,
            needed,
            available,
        } => {
            assert_eq!(asset_id, asset());
            assert_eq!(needed, 100);
            assert_eq!(available, 50);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_multi_asset_spend_is_rejected() {
    let sender = key(1).address();
    let set = UtxoSet::<Out>::new();
    let mut aad = AssetAmountDestination::new(vec![sender], vec![sender], vec![sender]);
    aad.add_amount(asset(), 1, 0).unwrap();
    aad.add_amount(other_asset(), 1, 0).unwrap();
    assert!(matches!(
        Spender::new(&set).spend::<In>(&aad),
        Err(TransactionError::MultiAssetSpend(2))
    ));
}

#[test]
fn test_add_amount_merges_same_asset() {
    let mut aad = AssetAmountDestination::default();
    aad.add_amount(asset(), 5, 1).unwrap().add_amount(asset(), 7, 2).unwrap();
    assert_eq!(aad.amounts.len(), 1);
    assert_eq!(aad.amounts[0].amount, 12);
    assert_eq!(aad.amounts[0].burn, 3);
    assert!(aad.add_amount(asset(), u64::MAX, 0).is_err());
}

#[test]
fn test_selection_is_amount_ascending() {
    let sender = key(1).address();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 500, OutputOwners::single(sender)));
    set.add(utxo(2, 0, asset(), 50, OutputOwners::single(sender)));
    set.add(utxo(3, 0, asset(), 60, OutputOwners::single(sender)));
    set.add(utxo(4, 0, other_asset(), 1, OutputOwners::single(sender)));

    let mut aad = AssetAmountDestination::new(vec![sender], vec![key(2).address()], vec![sender]);
    aad.add_amount(asset(), 100, 0).unwrap();
    let spend = Spender::new(&set).spend::<In>(&aad).unwrap();

    let consumed: Vec<Id> = spend.inputs.iter().map(|i| i.tx_id).collect();
    assert_eq!(consumed, vec![Id::new([2; 32]), Id::new([3; 32])]);
    assert!(inputs_sorted_unique(&spend.inputs));
    let total: u64 = spend.outputs.iter().map(|o| o.output.amount()).sum();
    assert_eq!(total, 110);
}

#[test]
fn test_unrelated_and_timelocked_utxos_are_skipped() {
    let sender = key(1).address();
    let stranger = key(9).address();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 1000, OutputOwners::single(stranger)));
    set.add(utxo(2, 0, asset(), 1000, OutputOwners::new(500, 1, [sender]).unwrap()));
    set.add(utxo(3, 0, asset(), 40, OutputOwners::single(sender)));

    let mut aad = AssetAmountDestination::new(vec![sender], vec![stranger], vec![sender]);
    aad.add_amount(asset(), 100, 0).unwrap();
    assert!(matches!(
        Spender::new(&set).as_of(100).spend::<In>(&aad),
        Err(TransactionError::InsufficientFunds { available: 40, .. })
    ));

    let spend = Spender::new(&set).as_of(500).spend::<In>(&aad).unwrap();
    assert_eq!(spend.inputs.len(), 2);
}

#[test]
fn test_zero_amount_burn_only_spend() {
    let sender = key(1).address();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 100, OutputOwners::single(sender)));

    let mut aad = AssetAmountDestination::new(vec![sender], vec![], vec![sender]);
    aad.add_amount(asset(), 0, 10).unwrap();
    let spend = Spender::new(&set).spend::<In>(&aad).unwrap();
    assert_eq!(spend.outputs.len(), 1);
    assert_eq!(spend.outputs[0].output.amount(), 90);
}

#[test]
fn test_lock_modes_require_lock_variants() {
    let sender = key(1).address();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 100, OutputOwners::single(sender)));

    let mut aad = AssetAmountDestination::new(vec![sender], vec![sender], vec![sender]);
    aad.add_amount(asset(), 50, 0).unwrap();
    assert!(matches!(
        Spender::new(&set).lock_mode(LockMode::Deposit).spend::<In>(&aad),
        Err(TransactionError::UnsupportedLock(_))
    ));
}

#[test]
fn test_alias_owned_utxo_is_spendable_through_resolver() {
    let x = key(1).address();
    let y = key(2).address();
    let alias = ShortId::new([0xee; 20]);
    let mut aliases = AliasMap::new();
    aliases.insert(alias, OutputOwners::new(0, 1, [x, y]).unwrap());

    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 100, OutputOwners::single(alias)));

    let mut aad = AssetAmountDestination::new(vec![alias], vec![y], vec![alias]);
    aad.signers = vec![x];
    aad.add_amount(asset(), 60, 0).unwrap();

    assert!(Spender::new(&set).spend::<In>(&aad).is_err());
    let spend = Spender::new(&set).resolver(&aliases).spend::<In>(&aad).unwrap();
    assert_eq!(spend.inputs[0].input.sig_indices(), &[SigIdx::with_source(0, alias)]);
}

// -----------------------------------------------------------------------
// Signing engine
// -----------------------------------------------------------------------

#[test]
fn test_multisig_threshold_signature_order() {
    let keys: Vec<KeyPair> = (1..=3).map(key).collect();
    let owners = OutputOwners::new(0, 2, keys.iter().map(|k| k.address())).unwrap();
    let sorted = owners.addresses().to_vec();
    let (x, y) = (sorted[0], sorted[1]);

    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 1000, owners.clone()));

    // Insert in reverse owner order.
    let mut chain = KeyChain::new();
    for k in keys.iter().rev() {
        if k.address() == x || k.address() == y {
            chain.add(k.clone());
        }
    }

    let mut aad = AssetAmountDestination::new(vec![x, y], vec![x], vec![x]);
    aad.change_threshold = 1;
    aad.add_amount(asset(), 100, 1).unwrap();
    let spend = Spender::new(&set).spend::<In>(&aad).unwrap();
    let indices: Vec<u32> = spend.inputs[0].input.sig_indices().iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![0, 1]);

    let tx = build_tx(spend, b"");
    let signed = sign(tx.clone(), &chain).unwrap();
    assert_eq!(signed.credentials.len(), 1);
    assert_eq!(signed.credentials[0].signatures().len(), 2);
    assert_eq!(recovered_signers(&tx, &signed.credentials[0]), vec![x, y]);

    let again = sign(tx, &chain).unwrap();
    assert_eq!(again.credentials, signed.credentials);
}

#[test]
fn test_signed_roundtrip_and_id() {
    let sender = key(1);
    let mut chain = KeyChain::new();
    chain.add(sender.clone());
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 1000, OutputOwners::single(sender.address())));
    set.add(utxo(2, 3, asset(), 1000, OutputOwners::single(sender.address())));

    let mut aad = AssetAmountDestination::new(
        vec![sender.address()],
        vec![key(2).address()],
        vec![sender.address()],
    );
    aad.add_amount(asset(), 1500, 10).unwrap();
    let tx = build_tx(Spender::new(&set).spend::<In>(&aad).unwrap(), b"memo");
    let signed = sign(tx, &chain).unwrap();
    assert_eq!(signed.credentials.len(), 2);

    let bytes = signed.to_bytes();
    assert_eq!(&bytes[..2], &[0, 0]);
    let decoded = SignedTx::<Tx>::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.to_bytes(), bytes);
    assert_eq!(decoded.id(), signed.id());
    assert_eq!(decoded.id(), Id::from_sha256(&bytes));

    let from_hex = SignedTx::<Tx>::from_hex(&signed.to_hex()).unwrap();
    assert_eq!(from_hex.id(), signed.id());
}

#[test]
fn test_hash_is_deterministic_and_sensitive() {
    let sender = key(1).address();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 1000, OutputOwners::single(sender)));
    let mut aad = AssetAmountDestination::new(vec![sender], vec![key(2).address()], vec![sender]);
    aad.add_amount(asset(), 700, 10).unwrap();

    let a = build_tx(Spender::new(&set).spend::<In>(&aad).unwrap(), b"one");
    let b = build_tx(Spender::new(&set).spend::<In>(&aad).unwrap(), b"one");
    assert_eq!(a, b);
    assert_eq!(a.hash(), b.hash());

    let c = build_tx(Spender::new(&set).spend::<In>(&aad).unwrap(), b"two");
    assert_ne!(a.hash(), c.hash());

    let mut d = a.clone();
    let Out::Transfer(o) = &mut d.base.outputs[0].output;
    o.amount += 1;
    assert_ne!(a.hash(), d.hash());
}

#[test]
fn test_hash_depends_on_input_order() {
    let sender = key(1).address();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 400, OutputOwners::single(sender)));
    set.add(utxo(2, 0, asset(), 500, OutputOwners::single(sender)));
    let mut aad = AssetAmountDestination::new(vec![sender], vec![key(2).address()], vec![sender]);
    aad.add_amount(asset(), 800, 10).unwrap();

    let sorted = build_tx(Spender::new(&set).spend::<In>(&aad).unwrap(), b"");
    assert_eq!(sorted.base.inputs.len(), 2);
    let mut swapped = sorted.clone();
    swapped.base.inputs.swap(0, 1);
    assert_ne!(sorted, swapped);
    assert_ne!(sorted.hash(), swapped.hash());
    assert_ne!(sorted.unsigned_bytes(), swapped.unsigned_bytes());
}

#[test]
fn test_planned_tx_decodes_equal() {
    let sender = key(1).address();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 400, OutputOwners::single(sender)));
    set.add(utxo(2, 0, asset(), 500, OutputOwners::single(sender)));
    let mut aad = AssetAmountDestination::new(vec![sender], vec![key(2).address()], vec![sender]);
    aad.add_amount(asset(), 800, 10).unwrap();

    let planned = build_tx(Spender::new(&set).spend::<In>(&aad).unwrap(), b"memo");
    assert!(planned.base.inputs.iter().all(|i| i.input.sig_indices()[0].source.is_some()));
    let decoded = Tx::from_unsigned_bytes(&planned.unsigned_bytes()).unwrap();
    assert!(decoded.base.inputs.iter().all(|i| i.input.sig_indices()[0].source.is_none()));
    assert_eq!(decoded, planned);
}

#[test]
fn test_missing_key_and_partial_signing() {
    let keys: Vec<KeyPair> = (1..=2).map(key).collect();
    let owners = OutputOwners::new(0, 2, keys.iter().map(|k| k.address())).unwrap();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 100, owners.clone()));

    let mut aad = AssetAmountDestination::new(owners.addresses().to_vec(), vec![keys[0].address()], vec![keys[0].address()]);
    aad.add_amount(asset(), 50, 0).unwrap();
    let tx = build_tx(Spender::new(&set).spend::<In>(&aad).unwrap(), b"");

    let mut first = KeyChain::new();
    first.add(keys[0].clone());
    let mut second = KeyChain::new();
    second.add(keys[1].clone());

    let err = sign(tx.clone(), &first).unwrap_err();
    assert!(matches!(err, TransactionError::KeyNotFound { address } if address == keys[1].address()));
    assert!(err.is_recoverable());

    let (mut partial, missing) = sign_partial(tx.clone(), &first).unwrap();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].credential_index, 0);
    assert_eq!(missing[0].address, keys[1].address());
    assert!(!partial.is_fully_signed());

    let (other, _) = sign_partial(tx.clone(), &second).unwrap();
    assert_eq!(partial.merge(&other).unwrap(), 1);
    assert!(partial.is_fully_signed());

    let mut both = KeyChain::new();
    both.add(keys[0].clone());
    both.add(keys[1].clone());
    assert_eq!(partial, sign(tx, &both).unwrap());
}

#[test]
fn test_decoded_inputs_need_resolution() {
    let sender = key(1);
    let mut chain = KeyChain::new();
    chain.add(sender.clone());
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 100, OutputOwners::single(sender.address())));
    let mut aad = AssetAmountDestination::new(vec![sender.address()], vec![sender.address()], vec![sender.address()]);
    aad.add_amount(asset(), 10, 0).unwrap();
    let tx = build_tx(Spender::new(&set).spend::<In>(&aad).unwrap(), b"");

    let mut decoded = Tx::from_unsigned_bytes(&tx.unsigned_bytes()).unwrap();
    assert!(matches!(
        sign(decoded.clone(), &chain),
        Err(TransactionError::UnresolvedSigIdx { index: 0 })
    ));
    assert_eq!(decoded.base.resolve_signers(&set).unwrap(), 1);
    assert_eq!(sign(decoded, &chain).unwrap(), sign(tx, &chain).unwrap());
}

#[test]
fn test_multisig_keychain_signs_for_alias() {
    let x = key(1);
    let y = key(2);
    let z = key(3);
    let alias = ShortId::new([0xee; 20]);
    let alias_owners = OutputOwners::new(0, 2, [x.address(), y.address(), z.address()]).unwrap();
    let mut aliases = AliasMap::new();
    aliases.insert(alias, alias_owners.clone());

    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 100, OutputOwners::single(alias)));
    let mut aad = AssetAmountDestination::new(vec![alias], vec![x.address()], vec![alias]);
    aad.signers = vec![x.address(), z.address()];
    aad.add_amount(asset(), 60, 0).unwrap();
    let spend = Spender::new(&set).resolver(&aliases).spend::<In>(&aad).unwrap();
    let tx = build_tx(spend, b"");

    let mut chain = KeyChain::new();
    chain.add(z.clone());
    chain.add(x.clone());
    let signer = MultisigKeyChain::new(&chain, &aliases);
    let signed = sign(tx.clone(), &signer).unwrap();

    let Cred::Multisig(cred) = &signed.credentials[0] else {
        panic!("expected a multisig credential");
    };
    let expected: Vec<(u32, ShortId)> = alias_owners
        .addresses()
        .iter()
        .enumerate()
        .filter(|(_, a)| **a == x.address() || **a == z.address())
        .map(|(i, a)| (i as u32, *a))
        .collect();
    let got: Vec<(u32, ShortId)> = cred.sig_idxs.iter().map(|s| (s.index, s.source)).collect();
    assert_eq!(got, expected);
    let signers: Vec<ShortId> = expected.iter().map(|(_, a)| *a).collect();
    assert_eq!(recovered_signers(&tx, &signed.credentials[0]), signers);

    // Plain addresses still get a plain credential.
    let no_aliases = AliasMap::new();
    let plain = MultisigKeyChain::new(&chain, &no_aliases);
    let mut set = UtxoSet::new();
    set.add(utxo(2, 0, asset(), 100, OutputOwners::single(x.address())));
    let mut aad = AssetAmountDestination::new(vec![x.address()], vec![x.address()], vec![x.address()]);
    aad.add_amount(asset(), 10, 0).unwrap();
    let tx = build_tx(Spender::new(&set).spend::<In>(&aad).unwrap(), b"");
    assert!(matches!(sign(tx, &plain).unwrap().credentials[0], Cred::Secp(_)));
}

#[test]
fn test_multisig_keychain_reports_missing_owner() {
    let x = key(1);
    let y = key(2);
    let alias = ShortId::new([0xee; 20]);
    let mut aliases = AliasMap::new();
    aliases.insert(alias, OutputOwners::new(0, 2, [x.address(), y.address()]).unwrap());

    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 100, OutputOwners::single(alias)));
    let mut aad = AssetAmountDestination::new(vec![alias], vec![x.address()], vec![alias]);
    aad.signers = vec![x.address(), y.address()];
    aad.add_amount(asset(), 60, 0).unwrap();
    let tx = build_tx(Spender::new(&set).resolver(&aliases).spend::<In>(&aad).unwrap(), b"");

    let mut chain = KeyChain::new();
    chain.add(x.clone());
    let signer = MultisigKeyChain::new(&chain, &aliases);
    let (signed, missing) = sign_partial(tx, &signer).unwrap();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].address, y.address());
    let sigs = signed.credentials[0].signatures();
    assert_eq!(sigs.len(), 2);
    assert_eq!(sigs.iter().filter(|s| is_placeholder(s)).count(), 1);
}

// -----------------------------------------------------------------------
// Decoding
// -----------------------------------------------------------------------

#[test]
fn test_unknown_type_ids_are_rejected() {
    assert!(matches!(
        Out::select(99, Codec::V0),
        Err(TransactionError::UnknownTypeId { domain: Domain::Output, type_id: 99 })
    ));
    assert!(matches!(
        In::select(7, Codec::V0),
        Err(TransactionError::UnknownTypeId { domain: Domain::Input, .. })
    ));

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0u16.to_be_bytes());
    bytes.extend_from_slice(&77u32.to_be_bytes());
    assert!(matches!(
        Tx::from_unsigned_bytes(&bytes),
        Err(TransactionError::UnknownTypeId { domain: Domain::Transaction, type_id: 77 })
    ));
}

#[test]
fn test_truncated_tx_is_malformed() {
    let owner = key(1).address();
    let mut base = BaseTx::<In, Out>::new(NETWORK_ID, Id::ZERO);
    base.outputs.push(TransferableOutput::new(
        asset(),
        Out::Transfer(SecpTransferOutput::new(5, OutputOwners::single(owner))),
    ));
    let tx = Tx {
        codec: Codec::V0,
        base,
    };
    let bytes = tx.unsigned_bytes();
    for cut in [1, 10, bytes.len() - 1] {
        let err = Tx::from_unsigned_bytes(&bytes[..cut]).unwrap_err();
        assert!(matches!(err, TransactionError::Malformed { .. }), "cut {cut}: {err}");
    }
    let mut longer = bytes.clone();
    longer.push(0);
    assert!(Tx::from_unsigned_bytes(&longer).is_err());
}

#[test]
fn test_memo_limit() {
    assert!(BaseTx::<In, Out>::new(1, Id::ZERO).with_memo(vec![0u8; 256]).is_ok());
    assert!(BaseTx::<In, Out>::new(1, Id::ZERO).with_memo(vec![0u8; 257]).is_err());
}

// -----------------------------------------------------------------------
// UTXO set
// -----------------------------------------------------------------------

#[test]
fn test_utxo_wire_forms() {
    let u = utxo(7, 2, asset(), 99, OutputOwners::single(key(1).address()));
    let bytes = u.to_bytes();
    assert_eq!(bytes.len(), 2 + 32 + 4 + 32 + 4 + 8 + 16 + 20);
    assert_eq!(Utxo::<Out>::from_bytes(&bytes).unwrap(), u);
    assert_eq!(Utxo::<Out>::from_hex(&u.to_hex()).unwrap(), u);
    assert_eq!(Utxo::<Out>::from_cb58(&u.to_cb58()).unwrap(), u);
    assert!(u.to_hex().starts_with("0x"));
}

#[test]
fn test_utxo_set_index_and_balance() {
    let a = key(1).address();
    let b = key(2).address();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 10, OutputOwners::single(a)));
    set.add(utxo(2, 0, asset(), 20, OutputOwners::new(0, 1, [a, b]).unwrap()));
    set.add(utxo(3, 0, asset(), 40, OutputOwners::new(0, 2, [a, b]).unwrap()));
    set.add(utxo(4, 0, other_asset(), 80, OutputOwners::single(b)));
    set.add(utxo(5, 0, asset(), 160, OutputOwners::new(1000, 1, [a]).unwrap()));

    assert_eq!(set.len(), 5);
    assert_eq!(set.for_addresses(&[b]).len(), 3);
    assert_eq!(set.asset_ids(), vec![asset(), other_asset()]);
    assert_eq!(set.balance(&[a], &asset(), 0).unwrap(), 30);
    assert_eq!(set.balance(&[a, b], &asset(), 0).unwrap(), 70);
    assert_eq!(set.balance(&[a], &asset(), 1000).unwrap(), 190);

    let removed = set.remove(&crate::utxo::UtxoId::new(Id::new([4; 32]), 0)).unwrap();
    assert_eq!(removed.amount(), 80);
    assert_eq!(set.for_addresses(&[b]).len(), 2);
}

#[test]
fn test_utxo_set_algebra() {
    let a = key(1).address();
    let mut left = UtxoSet::new();
    left.add(utxo(1, 0, asset(), 1, OutputOwners::single(a)));
    left.add(utxo(2, 0, asset(), 2, OutputOwners::single(a)));
    let mut right = UtxoSet::new();
    right.add(utxo(2, 0, asset(), 2, OutputOwners::single(a)));
    right.add(utxo(3, 0, asset(), 3, OutputOwners::single(a)));

    assert_eq!(left.union(&right).len(), 3);
    let diff = left.difference(&right);
    assert_eq!(diff.len(), 1);
    assert_eq!(diff.iter().next().unwrap().amount(), 1);
    let both = left.intersection(&right);
    assert_eq!(both.len(), 1);
    assert_eq!(both.iter().next().unwrap().amount(), 2);
}

#[test]
fn test_utxo_set_decodes_hex_batches() {
    let a = key(1).address();
    let encoded: Vec<String> = (1..=3)
        .map(|i| utxo(i, 0, asset(), i as u64, OutputOwners::single(a)).to_hex())
        .collect();
    let mut set = UtxoSet::<Out>::new();
    assert_eq!(set.add_hex(&encoded).unwrap(), 3);
    assert_eq!(set.balance(&[a], &asset(), 0).unwrap(), 6);

    let mut bad = encoded.clone();
    bad.push("0xdeadbeef".to_string());
    assert!(UtxoSet::<Out>::new().add_hex(&bad).is_err());
}

#[test]
fn test_spend_does_not_mutate_set() {
    let a = key(1).address();
    let mut set = UtxoSet::new();
    set.add(utxo(1, 0, asset(), 100, OutputOwners::single(a)));
    let mut aad = AssetAmountDestination::new(vec![a], vec![a], vec![a]);
    aad.add_amount(asset(), 100, 0).unwrap();
    let spend = Spender::new(&set).spend::<In>(&aad).unwrap();
    assert_eq!(set.len(), 1);

    let mut reserved = UtxoSet::new();
    for input in &spend.inputs {
        if let Some(u) = set.get(&input.utxo_id()) {
            reserved.add(u.clone());
        }
    }
    let remaining = set.difference(&reserved);
    assert!(remaining.is_empty());
    assert!(matches!(
        Spender::new(&remaining).spend::<In>(&aad),
        Err(TransactionError::InsufficientFunds { .. })
    ));
}
