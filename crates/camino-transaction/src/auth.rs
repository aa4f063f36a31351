//! Subnet and consortium authorization.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::ShortId;

use crate::codec::{Codec, Encodable};
use crate::owners::OutputOwners;
use crate::secp::{read_sig_indices, write_sig_indices, SigIdx};
use crate::TransactionError;

/// Names, by index into an externally known owner set, the addresses that
/// must co-sign an administrative action.  It holds no signatures itself;
/// the signer emits a separate credential for it after the input
/// credentials.
///
/// # Wire format
///
/// | Field        | Size          |
/// |--------------|---------------|
/// | num indices  | 4 bytes (BE)  |
/// | indices      | 4 bytes each  |
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubnetAuth {
    pub sig_indices: Vec<SigIdx>,
}

impl SubnetAuth {
    pub fn new(sig_indices: Vec<SigIdx>) -> Self {
        SubnetAuth { sig_indices }
    }

    /// Authorize with the given owners, recording each signer's address.
    pub fn from_signers(signers: &[(u32, ShortId)]) -> Self {
        let mut sig_indices: Vec<SigIdx> = signers
            .iter()
            .map(|(index, address)| SigIdx::with_source(*index, *address))
            .collect();
        sig_indices.sort_by_key(|s| s.index);
        sig_indices.dedup_by_key(|s| s.index);
        SubnetAuth { sig_indices }
    }

    /// Attach signing addresses from the owner set the indices point into.
    ///
    /// Needed after decoding, when indices carry no source.
    pub fn resolve(&mut self, owners: &OutputOwners) -> Result<(), TransactionError> {
        for sig in &mut self.sig_indices {
            let address = owners
                .addresses()
                .get(sig.index as usize)
                .ok_or(TransactionError::UnresolvedSigIdx { index: sig.index })?;
            sig.source = Some(*address);
        }
        Ok(())
    }
}

impl Encodable for SubnetAuth {
    fn write_to(&self, writer: &mut ByteWriter, _codec: Codec) {
        write_sig_indices(writer, &self.sig_indices);
    }

    fn read_from(reader: &mut ByteReader<'_>, _codec: Codec) -> Result<Self, TransactionError> {
        Ok(SubnetAuth {
            sig_indices: read_sig_indices(reader)?,
        })
    }
}
