//! # Money
//!
//! Amounts are carried in the smallest currency unit (tyiyn for KGS) so the
//! value that gets signed is always an integer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency code the gateway settles in
pub const CURRENCY_KGS: &str = "KGS";

/// Minor units per major unit (1 som = 100 tyiyn)
const MINOR_PER_MAJOR: i64 = 100;

/// Amount in the smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Create an amount from minor units (tyiyn)
    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Convert a decimal major-unit amount (e.g. `150.50` som), rounding to the nearest minor unit
    pub fn from_major(major: f64) -> Self {
        Self((major * MINOR_PER_MAJOR as f64).round() as i64)
    }

    /// Raw minor-unit value
    pub fn minor(&self) -> i64 {
        self.0
    }

    /// Decimal major-unit value
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MINOR_PER_MAJOR as u64;
        write!(f, "{}{}.{:02} {}", sign, abs / per, abs % per, CURRENCY_KGS)
    }
}
