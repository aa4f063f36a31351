//! Authorization objects: signer indices into an owner set known on chain.

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_transaction::codec::{Codec, Domain, Encodable, Variant};
use camino_transaction::secp::SecpCredential;
use camino_transaction::{CredentialRequirement, SubnetAuth, TransactionError};

use crate::inputs::Credential;
use crate::type_ids;

/// Every authorization the platform chain knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Subnet(SubnetAuth),
}

impl Variant for Authorization {
    const DOMAIN: Domain = Domain::Authorization;

    fn select(type_id: u32, _codec: Codec) -> Result<Self, TransactionError> {
        match type_id {
            type_ids::SUBNET_AUTH => Ok(Authorization::Subnet(SubnetAuth::default())),
            _ => Err(Self::unknown(type_id)),
        }
    }

    fn type_id(&self, _codec: Codec) -> u32 {
        match self {
            Authorization::Subnet(_) => type_ids::SUBNET_AUTH,
        }
    }

    fn write_body(&self, writer: &mut ByteWriter, codec: Codec) {
        let Authorization::Subnet(auth) = self;
        auth.write_to(writer, codec);
    }

    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError> {
        let Authorization::Subnet(auth) = self;
        *auth = SubnetAuth::read_from(reader, codec)?;
        Ok(())
    }
}

/// Write an authorization field as `type ID | body`.
pub fn write_auth(writer: &mut ByteWriter, auth: &SubnetAuth, codec: Codec) {
    writer.write_u32_be(type_ids::SUBNET_AUTH);
    auth.write_to(writer, codec);
}

/// Read an authorization field.
pub fn read_auth(reader: &mut ByteReader<'_>, codec: Codec) -> Result<SubnetAuth, TransactionError> {
    let Authorization::Subnet(auth) = Authorization::read_typed(reader, codec)?;
    Ok(auth)
}

/// The credential that satisfies `auth`.
pub fn auth_requirement(auth: &SubnetAuth) -> CredentialRequirement<Credential> {
    CredentialRequirement::new(Credential::Secp(SecpCredential::default()), auth.sig_indices.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_primitives::ShortId;

    #[test]
    fn test_auth_field_roundtrip() {
        let auth = SubnetAuth::from_signers(&[(1, ShortId::new([1; 20]))]);
        let mut w = ByteWriter::new();
        write_auth(&mut w, &auth, Codec::V0);
        let bytes = w.into_bytes();
        assert_eq!(hex::encode(&bytes), "0000000a0000000100000001");
        let mut r = ByteReader::new(&bytes);
        let decoded = read_auth(&mut r, Codec::V0).unwrap();
        assert_eq!(decoded.sig_indices[0].index, 1);
        assert_eq!(auth_requirement(&auth).signers[0].source, Some(ShortId::new([1; 20])));
    }

    #[test]
    fn test_unknown_authorization() {
        assert!(matches!(
            Authorization::select(11, Codec::V0),
            Err(TransactionError::UnknownTypeId { domain: Domain::Authorization, type_id: 11 })
        ));
    }
}
