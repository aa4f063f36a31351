//! Base58 and CB58 encoding.
//!
//! CB58 is Base58 over `payload || checksum`, where the checksum is the
//! last 4 bytes of SHA-256(payload).  It is the human-facing form of IDs,
//! node IDs and private keys.

use crate::hash::sha256;
use crate::PrimitivesError;

/// Number of checksum bytes appended by CB58.
pub const CHECKSUM_LEN: usize = 4;

/// Encode a byte slice to a Base58 string (Bitcoin alphabet).
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string to a byte vector.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = sha256(data);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[32 - CHECKSUM_LEN..]);
    out
}

/// Append the 4-byte checksum to `data`.
pub fn with_checksum(data: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum(data));
    payload
}

/// Verify and strip a trailing 4-byte checksum.
pub fn strip_checksum(data: &[u8]) -> Result<&[u8], PrimitivesError> {
    if data.len() < CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidLength {
            expected: CHECKSUM_LEN,
            got: data.len(),
        });
    }
    let (payload, sum) = data.split_at(data.len() - CHECKSUM_LEN);
    if sum != checksum(payload) {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok(payload)
}

/// Encode bytes as CB58: Base58 of the payload followed by its checksum.
///
/// # Arguments
/// * `data` - The payload bytes.
///
/// # Returns
/// A CB58 string.
pub fn check_encode(data: &[u8]) -> String {
    encode(&with_checksum(data))
}

/// Decode a CB58 string, verifying and stripping the 4-byte checksum.
///
/// # Returns
/// The payload bytes, `InvalidBase58` for malformed input, or
/// `ChecksumMismatch` when the trailing checksum does not match.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = decode(s)?;
    if decoded.len() < CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    Ok(strip_checksum(&decoded)?.to_vec())
}

/// Encode as `0x`-prefixed hex with a trailing checksum (the node API form).
pub fn check_encode_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(with_checksum(data)))
}

/// Decode `0x`-prefixed (or bare) hex and verify its trailing checksum.
pub fn check_decode_hex(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
    Ok(strip_checksum(&decoded)?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_empty_string() {
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_base58_leading_zeros() {
        let input = hex::decode("000000287FB4CD").unwrap();
        assert_eq!(encode(&input), "111233QC4");
        assert_eq!(decode("111233QC4").unwrap(), input);
    }

    #[test]
    fn test_base58_decode_invalid_character() {
        assert!(decode("invalid!@#$%").is_err());
    }

    #[test]
    fn test_cb58_zero_id() {
        // The all-zero 32-byte ID (the platform chain ID) has a well-known form.
        assert_eq!(check_encode(&[0u8; 32]), "11111111111111111111111111111111LpoYY");
        assert_eq!(check_decode("11111111111111111111111111111111LpoYY").unwrap(), vec![0u8; 32]);
    }

    #[test]
    fn test_cb58_roundtrip() {
        let payload = hex::decode("00f54a5851e9372b87810a8e60cdd2e7cfd80b6e31").unwrap();
        let encoded = check_encode(&payload);
        assert_eq!(check_decode(&encoded).unwrap(), payload);
    }

    #[test]
    fn test_cb58_bad_checksum() {
        let mut encoded = check_encode(&[0x80, 0x01, 0x02, 0x03]);
        let last = encoded.pop().unwrap();
        encoded.push(if last == '1' { '2' } else { '1' });
        assert!(matches!(
            check_decode(&encoded),
            Err(PrimitivesError::ChecksumMismatch) | Err(PrimitivesError::InvalidBase58(_))
        ));
    }

    #[test]
    fn test_cb58_too_short() {
        assert!(matches!(check_decode("1"), Err(PrimitivesError::InvalidBase58(_))));
    }

    #[test]
    fn test_hex_with_checksum_roundtrip() {
        let data = [0xde, 0xad, 0xbe, 0xef];
        let encoded = check_encode_hex(&data);
        assert!(encoded.starts_with("0x"));
        assert_eq!(encoded.len(), 2 + 2 * (data.len() + CHECKSUM_LEN));
        assert_eq!(check_decode_hex(&encoded).unwrap(), data);

        let mut corrupted = encoded.clone();
        corrupted.replace_range(2..4, "00");
        assert!(matches!(
            check_decode_hex(&corrupted),
            Err(PrimitivesError::ChecksumMismatch)
        ));
    }
}
