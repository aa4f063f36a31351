//! Delegation fee as a fixed-point percentage.

use std::fmt;
use std::str::FromStr;

use camino_transaction::TransactionError;

/// Shares per whole percent: four decimal places.
pub const SHARES_PER_PERCENT: u32 = 10_000;

/// 100 percent.
pub const MAX_SHARES: u32 = 100 * SHARES_PER_PERCENT;

/// Fraction of delegation rewards a validator keeps, in millionths.
///
/// `12.5` percent is 125 000 shares. Parsing never goes through floating
/// point, so the decimal string and the wire value always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DelegationFee(u32);

impl DelegationFee {
    pub fn from_shares(shares: u32) -> Result<Self, TransactionError> {
        if shares > MAX_SHARES {
            return Err(TransactionError::DelegationFeeRange(format!(
                "{} shares exceeds {}",
                shares, MAX_SHARES
            )));
        }
        Ok(DelegationFee(shares))
    }

    /// Whole percent, e.g. `from_percent(2)` is 2%.
    pub fn from_percent(percent: u32) -> Result<Self, TransactionError> {
        let shares = percent
            .checked_mul(SHARES_PER_PERCENT)
            .ok_or_else(|| TransactionError::DelegationFeeRange(format!("{}%", percent)))?;
        Self::from_shares(shares)
    }

    pub fn shares(&self) -> u32 {
        self.0
    }
}

impl FromStr for DelegationFee {
    type Err = TransactionError;

    /// Parse a decimal percentage. Digits past the fourth decimal place
    /// round half-up to the nearest share.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || TransactionError::DelegationFeeRange(format!("invalid percentage {:?}", s));
        let trimmed = s.trim();
        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(bad());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| bad())?
        };
        let digits = frac.as_bytes();
        let mut frac_shares = 0u32;
        for (i, digit) in digits.iter().take(4).enumerate() {
            frac_shares += u32::from(digit - b'0') * 10u32.pow(3 - i as u32);
        }
        let round_up = u32::from(digits.get(4).map_or(false, |d| *d >= b'5'));
        let shares = whole
            .checked_mul(SHARES_PER_PERCENT)
            .and_then(|w| w.checked_add(frac_shares))
            .and_then(|s| s.checked_add(round_up))
            .ok_or_else(bad)?;
        Self::from_shares(shares)
    }
}

impl fmt::Display for DelegationFee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SHARES_PER_PERCENT;
        let frac = self.0 % SHARES_PER_PERCENT;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:04}", frac);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}
