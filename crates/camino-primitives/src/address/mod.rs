//! Human-readable chain addresses.
//!
//! An address string is `<chain alias>-<bech32(hrp, short id)>`, for
//! example `P-kopernikus1...`.  The chain alias is free text (`X`, `P`, `C`
//! or a blockchain ID) and the payload is always a 20-byte `ShortId`.

use bech32::{Bech32, Hrp};

use crate::ids::ShortId;
use crate::PrimitivesError;

/// A parsed chain address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainAddress {
    /// Chain alias before the `-` separator.
    pub chain: String,
    /// Bech32 human-readable part (the network HRP).
    pub hrp: String,
    /// The 20-byte address.
    pub short_id: ShortId,
}

/// Render a bech32 address without a chain prefix.
pub fn format_bech32(hrp: &str, short_id: &ShortId) -> Result<String, PrimitivesError> {
    let hrp = Hrp::parse(hrp).map_err(|e| PrimitivesError::InvalidBech32(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, short_id.as_bytes())
        .map_err(|e| PrimitivesError::InvalidBech32(e.to_string()))
}

/// Render `<chain>-<bech32>`.
pub fn format_address(chain: &str, hrp: &str, short_id: &ShortId) -> Result<String, PrimitivesError> {
    Ok(format!("{}-{}", chain, format_bech32(hrp, short_id)?))
}

/// Parse a bech32 address without a chain prefix into `(hrp, short id)`.
pub fn parse_bech32(s: &str) -> Result<(String, ShortId), PrimitivesError> {
    let (hrp, data) =
        bech32::decode(s).map_err(|e| PrimitivesError::InvalidBech32(e.to_string()))?;
    let short_id = ShortId::from_slice(&data)
        .map_err(|_| PrimitivesError::InvalidAddress(format!("payload is {} bytes", data.len())))?;
    Ok((hrp.as_str().to_lowercase(), short_id))
}

/// Parse `<chain>-<bech32>`.
pub fn parse_address(s: &str) -> Result<ChainAddress, PrimitivesError> {
    let (chain, rest) = s
        .split_once('-')
        .ok_or_else(|| PrimitivesError::InvalidAddress(format!("missing chain separator: {}", s)))?;
    if chain.is_empty() {
        return Err(PrimitivesError::InvalidAddress("empty chain alias".into()));
    }
    let (hrp, short_id) = parse_bech32(rest)?;
    Ok(ChainAddress {
        chain: chain.to_string(),
        hrp,
        short_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_and_parse() {
        let id = ShortId::new([0x42; 20]);
        let s = format_address("P", "kopernikus", &id).unwrap();
        assert!(s.starts_with("P-kopernikus1"));

        let parsed = parse_address(&s).unwrap();
        assert_eq!(parsed.chain, "P");
        assert_eq!(parsed.hrp, "kopernikus");
        assert_eq!(parsed.short_id, id);
    }

    #[test]
    fn test_missing_separator() {
        let id = ShortId::new([1; 20]);
        let bare = format_bech32("camino", &id).unwrap();
        assert!(matches!(
            parse_address(&bare),
            Err(PrimitivesError::InvalidAddress(_))
        ));
        assert_eq!(parse_bech32(&bare).unwrap().1, id);
    }

    #[test]
    fn test_corrupted_checksum() {
        let id = ShortId::new([9; 20]);
        let mut s = format_address("X", "camino", &id).unwrap();
        let last = s.pop().unwrap();
        s.push(if last == 'q' { 'p' } else { 'q' });
        assert!(matches!(
            parse_address(&s),
            Err(PrimitivesError::InvalidBech32(_))
        ));
    }

    #[test]
    fn test_wrong_payload_length() {
        let hrp = Hrp::parse("camino").unwrap();
        let s = bech32::encode::<Bech32>(hrp, &[1u8; 19]).unwrap();
        assert!(matches!(
            parse_bech32(&s),
            Err(PrimitivesError::InvalidAddress(_))
        ));
    }
}
