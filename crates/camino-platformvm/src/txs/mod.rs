//! Platform chain transactions.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::ShortId;
use camino_transaction::codec::{Codec, Domain, Encodable, Variant};
use camino_transaction::secp::SecpCredential;
use camino_transaction::transferable::resolve_input_signers;
use camino_transaction::{
    CredentialRequirement, InputVariant, SigIdx, SubnetAuth, TransactionError, TransferableInput, UtxoSet,
};

use crate::auth::auth_requirement;
use crate::inputs::{Credential, Input};
use crate::outputs::Output;
use crate::type_ids;

mod atomic;
mod camino;
mod staking;
mod subnet;

pub use atomic::{ExportTx, ImportTx};
pub use camino::{
    address_state, AddressStateTx, ClaimTx, ClaimType, Claimable, DepositTx, MultisigAlias, MultisigAliasTx,
    RegisterNodeTx, UnlockDepositTx,
};
pub use staking::{
    AddDelegatorTx, AddSubnetValidatorTx, AddValidatorTx, CaminoAddValidatorTx, RemoveSubnetValidatorTx,
    SubnetValidator, Validator,
};
pub use subnet::{CreateChainTx, CreateSubnetTx, MAX_CHAIN_NAME_LEN};

pub type BaseTx = camino_transaction::BaseTx<Input, Output>;

/// What the signer needs to know about a transaction body beyond its bytes.
pub trait PlatformTx {
    fn base(&self) -> &BaseTx;

    fn base_mut(&mut self) -> &mut BaseTx;

    /// Authorizations that each need a credential after the input
    /// credentials, in wire order.
    fn authorizations(&self, _codec: Codec) -> Vec<&SubnetAuth> {
        Vec::new()
    }

    fn authorizations_mut(&mut self, _codec: Codec) -> Vec<&mut SubnetAuth> {
        Vec::new()
    }

    /// Address of a node key that signs last, if the transaction needs one.
    fn node_signer(&self) -> Option<ShortId> {
        None
    }
}

impl PlatformTx for BaseTx {
    fn base(&self) -> &BaseTx {
        self
    }

    fn base_mut(&mut self) -> &mut BaseTx {
        self
    }
}

/// Every transaction the platform chain knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Base(BaseTx),
    AddValidator(AddValidatorTx),
    AddSubnetValidator(AddSubnetValidatorTx),
    AddDelegator(AddDelegatorTx),
    CreateChain(CreateChainTx),
    CreateSubnet(CreateSubnetTx),
    Import(ImportTx),
    Export(ExportTx),
    RemoveSubnetValidator(RemoveSubnetValidatorTx),
    CaminoAddValidator(CaminoAddValidatorTx),
    AddressState(AddressStateTx),
    Deposit(DepositTx),
    UnlockDeposit(UnlockDepositTx),
    Claim(ClaimTx),
    RegisterNode(RegisterNodeTx),
    MultisigAlias(MultisigAliasTx),
}

/// Run `$body` with `$tx` bound to the variant payload.
macro_rules! each_tx {
    ($value:expr, $tx:ident => $body:expr) => {
        match $value {
            Transaction::Base($tx) => $body,
            Transaction::AddValidator($tx) => $body,
            Transaction::AddSubnetValidator($tx) => $body,
            Transaction::AddDelegator($tx) => $body,
            Transaction::CreateChain($tx) => $body,
            Transaction::CreateSubnet($tx) => $body,
            Transaction::Import($tx) => $body,
            Transaction::Export($tx) => $body,
            Transaction::RemoveSubnetValidator($tx) => $body,
            Transaction::CaminoAddValidator($tx) => $body,
            Transaction::AddressState($tx) => $body,
            Transaction::Deposit($tx) => $body,
            Transaction::UnlockDeposit($tx) => $body,
            Transaction::Claim($tx) => $body,
            Transaction::RegisterNode($tx) => $body,
            Transaction::MultisigAlias($tx) => $body,
        }
    };
}

fn input_requirement(input: &TransferableInput<Input>) -> CredentialRequirement<Credential> {
    CredentialRequirement::new(input.input.credential(), input.input.sig_indices().to_vec())
}

impl Transaction {
    pub fn body(&self) -> &dyn PlatformTx {
        each_tx!(self, tx => tx)
    }

    pub fn body_mut(&mut self) -> &mut dyn PlatformTx {
        each_tx!(self, tx => tx)
    }

    pub fn base(&self) -> &BaseTx {
        self.body().base()
    }

    pub fn base_mut(&mut self) -> &mut BaseTx {
        self.body_mut().base_mut()
    }

    /// Credentials in wire order: base inputs, imported inputs, one per
    /// authorization, then the node key.
    pub fn credential_requirements(&self, codec: Codec) -> Vec<CredentialRequirement<Credential>> {
        let body = self.body();
        let mut requirements: Vec<_> = body.base().inputs.iter().map(input_requirement).collect();
        if let Transaction::Import(tx) = self {
            requirements.extend(tx.imported_inputs.iter().map(input_requirement));
        }
        requirements.extend(body.authorizations(codec).into_iter().map(auth_requirement));
        if let Some(node) = body.node_signer() {
            requirements.push(CredentialRequirement::new(
                Credential::Secp(SecpCredential::default()),
                vec![SigIdx::with_source(0, node)],
            ));
        }
        requirements
    }

    /// Attach signing addresses to decoded inputs.
    ///
    /// `imported` covers the inputs of an import and may be `utxos`.
    /// Authorizations point into owner sets held in chain state; resolve
    /// those with [`SubnetAuth::resolve`] through [`PlatformTx::authorizations_mut`].
    pub fn resolve_signers(
        &mut self,
        utxos: &UtxoSet<Output>,
        imported: &UtxoSet<Output>,
    ) -> Result<usize, TransactionError> {
        let mut resolved = self.base_mut().resolve_signers(utxos)?;
        if let Transaction::Import(tx) = self {
            resolved += resolve_input_signers(&mut tx.imported_inputs, imported)?;
        }
        Ok(resolved)
    }
}

impl Variant for Transaction {
    const DOMAIN: Domain = Domain::Transaction;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        Ok(match type_id {
            type_ids::BASE_TX => Transaction::Base(BaseTx::default()),
            type_ids::ADD_VALIDATOR_TX => Transaction::AddValidator(AddValidatorTx::default()),
            type_ids::ADD_SUBNET_VALIDATOR_TX => Transaction::AddSubnetValidator(AddSubnetValidatorTx::default()),
            type_ids::ADD_DELEGATOR_TX => Transaction::AddDelegator(AddDelegatorTx::default()),
            type_ids::CREATE_CHAIN_TX => Transaction::CreateChain(CreateChainTx::default()),
            type_ids::CREATE_SUBNET_TX => Transaction::CreateSubnet(CreateSubnetTx::default()),
            type_ids::IMPORT_TX => Transaction::Import(ImportTx::default()),
            type_ids::EXPORT_TX => Transaction::Export(ExportTx::default()),
            type_ids::REMOVE_SUBNET_VALIDATOR_TX => {
                Transaction::RemoveSubnetValidator(RemoveSubnetValidatorTx::default())
            }
            type_ids::CAMINO_ADD_VALIDATOR_TX => Transaction::CaminoAddValidator(CaminoAddValidatorTx::default()),
            type_ids::ADDRESS_STATE_TX => Transaction::AddressState(AddressStateTx::default()),
            type_ids::DEPOSIT_TX => Transaction::Deposit(DepositTx::default()),
            type_ids::UNLOCK_DEPOSIT_TX => Transaction::UnlockDeposit(UnlockDepositTx::default()),
            type_ids::CLAIM_TX => Transaction::Claim(ClaimTx::default()),
            type_ids::REGISTER_NODE_TX => Transaction::RegisterNode(RegisterNodeTx::default()),
            type_ids::MULTISIG_ALIAS_TX => Transaction::MultisigAlias(MultisigAliasTx::default()),
            _ => return Err(Self::unknown(type_id)),
        })
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        match self {
            Transaction::Base(_) => type_ids::BASE_TX,
            Transaction::AddValidator(_) => type_ids::ADD_VALIDATOR_TX,
            Transaction::AddSubnetValidator(_) => type_ids::ADD_SUBNET_VALIDATOR_TX,
            Transaction::AddDelegator(_) => type_ids::ADD_DELEGATOR_TX,
            Transaction::CreateChain(_) => type_ids::CREATE_CHAIN_TX,
            Transaction::CreateSubnet(_) => type_ids::CREATE_SUBNET_TX,
            Transaction::Import(_) => type_ids::IMPORT_TX,
            Transaction::Export(_) => type_ids::EXPORT_TX,
            Transaction::RemoveSubnetValidator(_) => type_ids::REMOVE_SUBNET_VALIDATOR_TX,
            Transaction::CaminoAddValidator(_) => type_ids::CAMINO_ADD_VALIDATOR_TX,
            Transaction::AddressState(_) => type_ids::ADDRESS_STATE_TX,
            Transaction::Deposit(_) => type_ids::DEPOSIT_TX,
            Transaction::UnlockDeposit(_) => type_ids::UNLOCK_DEPOSIT_TX,
            Transaction::Claim(_) => type_ids::CLAIM_TX,
            Transaction::RegisterNode(_) => type_ids::REGISTER_NODE_TX,
            Transaction::MultisigAlias(_) => type_ids::MULTISIG_ALIAS_TX,
        }
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        each_tx!(self, tx => tx.write_to(writer, codec))
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        each_tx!(self, tx => *tx = Encodable::read_from(reader, codec)?);
        Ok(())
    }
}
