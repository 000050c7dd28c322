//! Non-negative 256-bit integer amount.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::coins::CoinError;

/// On-chain integer amount. Serialized as a decimal string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Int(U256);

impl Int {
    pub const ZERO: Int = Int(U256::ZERO);

    pub fn from_u64(value: u64) -> Self {
        Int(U256::from(value))
    }

    pub(crate) fn from_raw(value: U256) -> Self {
        Int(value)
    }

    pub(crate) fn raw(self) -> U256 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Int) -> Result<Int, CoinError> {
        self.0.checked_add(other.0).map(Int).ok_or(CoinError::Overflow)
    }
}

impl From<u64> for Int {
    fn from(value: u64) -> Self {
        Int::from_u64(value)
    }
}

impl FromStr for Int {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoinError::InvalidInteger(s.to_string()));
        }
        U256::from_str_radix(s, 10)
            .map(Int)
            .map_err(|_| CoinError::Overflow)
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for Int {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Int {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IntVisitor;

        impl Visitor<'_> for IntVisitor {
            type Value = Int;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or decimal integer string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Int, E> {
                Ok(Int::from_u64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Int, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(IntVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let value: Int = "1000000000000000000000000".parse().unwrap();
        assert_eq!(value.to_string(), "1000000000000000000000000");
    }

    #[test]
    fn test_rejects_sign_and_garbage() {
        assert!("-1".parse::<Int>().is_err());
        assert!("+1".parse::<Int>().is_err());
        assert!("1.5".parse::<Int>().is_err());
        assert!("".parse::<Int>().is_err());
    }

    #[test]
    fn test_json_accepts_string_or_number() {
        let a: Int = serde_json::from_str("\"42\"").unwrap();
        let b: Int = serde_json::from_str("42").unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"42\"");
        assert!(serde_json::from_str::<Int>("-3").is_err());
    }
}
