//! # Fixed-Point Money
//!
//! Receipt sums are always expressed to two decimal places. Representing
//! them as `f64` would let rounding error leak into the turnover-counter
//! reconciliation, so every sum in the workspace is a [`FixedPoint2`] —
//! a signed count of hundredths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A signed decimal amount with exactly two fractional digits, stored as
/// hundredths of the unit to avoid floating-point representation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FixedPoint2(i64);

impl FixedPoint2 {
    /// Build a value directly from its integer count of hundredths.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The integer count of hundredths this value represents.
    pub fn as_cents(&self) -> i64 {
        self.0
    }

    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Checked addition; `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction; `None` on overflow.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Display for FixedPoint2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.0 < 0;
        let abs = self.0.unsigned_abs();
        let (whole, frac) = (abs / 100, abs % 100);
        write!(f, "{}{}.{:02}", if negative { "-" } else { "" }, whole, frac)
    }
}

/// Error parsing a [`FixedPoint2`] from its wire string representation.
#[derive(thiserror::Error, Debug)]
#[error("invalid fixed-point amount: \"{0}\"")]
pub struct FixedPointParseError(String);

impl FromStr for FixedPoint2 {
    type Err = FixedPointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sign, rest) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s.strip_prefix('+').unwrap_or(s)),
        };
        let mut parts = rest.splitn(2, '.');
        let whole = parts.next().unwrap_or("");
        let frac = parts.next().unwrap_or("0");
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FixedPointParseError(s.to_string()));
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FixedPointParseError(s.to_string()));
        }
        let whole: i64 = whole.parse().map_err(|_| FixedPointParseError(s.to_string()))?;
        let frac_value: i64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<2}");
            padded.parse().map_err(|_| FixedPointParseError(s.to_string()))?
        };
        let cents = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(frac_value))
            .ok_or_else(|| FixedPointParseError(s.to_string()))?;
        Ok(Self(sign * cents))
    }
}

impl TryFrom<String> for FixedPoint2 {
    type Error = FixedPointParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FixedPoint2> for String {
    fn from(value: FixedPoint2) -> Self {
        value.to_string()
    }
}
