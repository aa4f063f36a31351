//! Codec context and type dispatch.
//!
//! Every encodable entity takes an explicit [`Codec`] value instead of
//! consulting global state.  Polymorphic entities are closed sum types
//! implementing [`Variant`]; `Variant::select` is the single table from a
//! wire type ID to a variant, and `Variant::type_id` is its inverse.

use std::fmt;

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::PrimitivesError;

use crate::TransactionError;

/// Version of the byte layout in effect for one transaction.
///
/// Written as a big-endian `u16` at the start of every unsigned
/// transaction and UTXO.  It selects type-ID tables and optional fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Codec(pub u16);

impl Codec {
    /// The classic layout.
    pub const V0: Codec = Codec(0);
    /// The extended layout.
    pub const V1: Codec = Codec(1);

    /// The numeric codec ID.
    pub fn id(self) -> u16 {
        self.0
    }

    /// Read the two-byte codec prefix.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, TransactionError> {
        reader.read_u16_be().reading("codec id").map(Codec)
    }

    /// Write the two-byte codec prefix.
    pub fn write_to(self, writer: &mut ByteWriter) {
        writer.write_u16_be(self.0);
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "codec {}", self.0)
    }
}

/// The polymorphic entity families that carry a type ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Transaction,
    Input,
    Output,
    Credential,
    Authorization,
    Operation,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Transaction => "transaction",
            Domain::Input => "input",
            Domain::Output => "output",
            Domain::Credential => "credential",
            Domain::Authorization => "authorization",
            Domain::Operation => "operation",
        };
        f.write_str(name)
    }
}

/// Attach a field name to a low-level read failure.
///
/// Buffer overruns become `Malformed` with the failing offset; other
/// primitives errors pass through unchanged.
pub trait ReadExt<T> {
    fn reading(self, what: &str) -> Result<T, TransactionError>;
}

impl<T> ReadExt<T> for Result<T, PrimitivesError> {
    fn reading(self, what: &str) -> Result<T, TransactionError> {
        self.map_err(|e| match TransactionError::from(e) {
            TransactionError::Malformed { reason, offset } => {
                TransactionError::malformed(format!("reading {}: {}", what, reason), offset)
            }
            other => other,
        })
    }
}

/// Fail with `Malformed` if a reader did not consume its whole buffer.
pub fn expect_end(reader: &ByteReader<'_>, what: &str) -> Result<(), TransactionError> {
    if reader.remaining() != 0 {
        return Err(TransactionError::malformed(
            format!("{} trailing bytes after {}", reader.remaining(), what),
            reader.offset(),
        ));
    }
    Ok(())
}

/// A fixed-shape entity with a codec-aware binary layout.
pub trait Encodable: Sized {
    /// Append the encoded form to `writer`.
    fn write_to(&self, writer: &mut ByteWriter, codec: Codec);

    /// Decode one value, advancing `reader`.
    fn read_from(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError>;

    /// Encode to a fresh byte vector.
    fn to_bytes(&self, codec: Codec) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write_to(&mut writer, codec);
        writer.into_bytes()
    }

    /// Decode exactly one value from `bytes`; trailing bytes are an error.
    fn from_bytes(bytes: &[u8], codec: Codec) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let value = Self::read_from(&mut reader, codec)?;
        expect_end(&reader, "entity")?;
        Ok(value)
    }
}

/// A closed sum type whose variants are tagged by a `u32` type ID.
///
/// Decoding reads the tag, asks [`Variant::select`] for an empty variant,
/// then fills it with [`Variant::read_body`].  IDs outside the table fail
/// with [`TransactionError::UnknownTypeId`]; there is no fallback variant.
pub trait Variant: Sized {
    /// The family this sum type belongs to.
    const DOMAIN: Domain;

    /// Return an empty value of the variant registered for `type_id`.
    fn select(type_id: u32, codec: Codec) -> Result<Self, TransactionError>;

    /// The wire type ID of this variant under `codec`.
    fn type_id(&self, codec: Codec) -> u32;

    /// Append the variant body (everything after the type ID).
    fn write_body(&self, writer: &mut ByteWriter, codec: Codec);

    /// Fill this (freshly selected) variant from `reader`.
    fn read_body(&mut self, reader: &mut ByteReader<'_>, codec: Codec) -> Result<(), TransactionError>;

    /// Error for an ID that is not in the table.
    fn unknown(type_id: u32) -> TransactionError {
        TransactionError::UnknownTypeId {
            domain: Self::DOMAIN,
            type_id,
        }
    }

    /// Append `type_id | body`.
    fn write_typed(&self, writer: &mut ByteWriter, codec: Codec) {
        writer.write_u32_be(self.type_id(codec));
        self.write_body(writer, codec);
    }

    /// Decode `type_id | body`.
    fn read_typed(reader: &mut ByteReader<'_>, codec: Codec) -> Result<Self, TransactionError> {
        let type_id = reader.read_u32_be().reading("type id")?;
        let mut value = Self::select(type_id, codec)?;
        value.read_body(reader, codec)?;
        Ok(value)
    }

    /// Encode `type_id | body` to a fresh byte vector.
    fn to_typed_bytes(&self, codec: Codec) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write_typed(&mut writer, codec);
        writer.into_bytes()
    }

    /// Decode exactly one `type_id | body` from `bytes`.
    fn from_typed_bytes(bytes: &[u8], codec: Codec) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let value = Self::read_typed(&mut reader, codec)?;
        expect_end(&reader, "typed entity")?;
        Ok(value)
    }
}

/// Write a `u32` count followed by each element.
pub fn write_list<T: Encodable>(writer: &mut ByteWriter, items: &[T], codec: Codec) {
    writer.write_length_prefixed_array(items, |w, item| item.write_to(w, codec));
}

/// Read a `u32` count followed by that many elements.
///
/// `min_size` is the smallest encoded size of one element; counts that
/// cannot fit in the remaining bytes fail before any allocation.
pub fn read_list<T: Encodable>(
    reader: &mut ByteReader<'_>,
    codec: Codec,
    min_size: usize,
) -> Result<Vec<T>, TransactionError> {
    reader.read_length_prefixed_array(min_size, |r| T::read_from(r, codec))
}

/// Write a `u32` count followed by each element with its type ID.
pub fn write_typed_list<T: Variant>(writer: &mut ByteWriter, items: &[T], codec: Codec) {
    writer.write_length_prefixed_array(items, |w, item| item.write_typed(w, codec));
}

/// Read a `u32` count followed by that many typed elements.
pub fn read_typed_list<T: Variant>(
    reader: &mut ByteReader<'_>,
    codec: Codec,
) -> Result<Vec<T>, TransactionError> {
    reader.read_length_prefixed_array(4, |r| T::read_typed(r, codec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_prefix_roundtrip() {
        let mut w = ByteWriter::new();
        Codec(258).write_to(&mut w);
        assert_eq!(w.as_bytes(), &[0x01, 0x02]);
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        assert_eq!(Codec::read_from(&mut r).unwrap(), Codec(258));
    }

    #[test]
    fn test_reading_maps_overrun_to_malformed() {
        let mut r = ByteReader::new(&[0u8; 2]);
        let err = r.read_u32_be().reading("amount").unwrap_err();
        match err {
            TransactionError::Malformed { reason, offset } => {
                assert!(reason.contains("amount"));
                assert_eq!(offset, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_expect_end() {
        let data = [1u8, 2, 3];
        let mut r = ByteReader::new(&data);
        r.read_u8().unwrap();
        assert!(expect_end(&r, "x").is_err());
        r.read_bytes(2).unwrap();
        assert!(expect_end(&r, "x").is_ok());
    }
}
