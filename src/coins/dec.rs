//! Fixed-point decimal with 18 fractional digits.
//!
//! Tax rates and gas prices are decimals; fees and caps are integers. All
//! conversions between the two go through the named rounding operations below,
//! never through floating point.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::coins::{CoinError, Int};

/// Number of fractional digits.
pub const PRECISION: usize = 18;

const ONE_RAW: u64 = 1_000_000_000_000_000_000;

fn one() -> U256 {
    U256::from(ONE_RAW)
}

/// Non-negative decimal stored as `value * 10^18`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(U256);

impl Dec {
    pub const ZERO: Dec = Dec(U256::ZERO);

    pub fn from_int(value: Int) -> Result<Self, CoinError> {
        value
            .raw()
            .checked_mul(one())
            .map(Dec)
            .ok_or(CoinError::Overflow)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// `self * value`, exact.
    pub fn mul_int(self, value: Int) -> Result<Dec, CoinError> {
        self.0
            .checked_mul(value.raw())
            .map(Dec)
            .ok_or(CoinError::Overflow)
    }

    /// Smallest integral decimal `>= self`.
    pub fn ceil(self) -> Result<Dec, CoinError> {
        let rem = self.0 % one();
        if rem.is_zero() {
            return Ok(self);
        }
        (self.0 - rem)
            .checked_add(one())
            .map(Dec)
            .ok_or(CoinError::Overflow)
    }

    /// Integer part, dropping the fraction. Equal to floor for non-negative values.
    pub fn truncate_int(self) -> Int {
        Int::from_raw(self.0 / one())
    }

    /// Alias of [`Dec::truncate_int`] for readability at call sites that floor.
    pub fn floor_int(self) -> Int {
        self.truncate_int()
    }
}

impl FromStr for Dec {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoinError::InvalidDecimal(s.to_string());

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if s.contains('.') && frac_part.is_empty() {
            return Err(invalid());
        }
        if !frac_part.bytes().all(|b| b.is_ascii_digit()) || frac_part.len() > PRECISION {
            return Err(invalid());
        }

        let whole = U256::from_str_radix(int_part, 10).map_err(|_| CoinError::Overflow)?;
        let mut frac = U256::ZERO;
        if !frac_part.is_empty() {
            let padded = format!("{frac_part:0<width$}", width = PRECISION);
            frac = U256::from_str_radix(&padded, 10).map_err(|_| invalid())?;
        }

        whole
            .checked_mul(one())
            .and_then(|w| w.checked_add(frac))
            .map(Dec)
            .ok_or(CoinError::Overflow)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / one();
        let frac = self.0 % one();
        write!(f, "{whole}.{:0>width$}", frac.to_string(), width = PRECISION)
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DecVisitor;

        impl Visitor<'_> for DecVisitor {
            type Value = Dec;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Dec, E> {
                Dec::from_int(Int::from_u64(v)).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Dec, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(DecVisitor)
    }
}
