//! Amounts, decimals and coin sets.
//!
//! # Responsibilities
//! - 256-bit non-negative integer amounts ([`Int`])
//! - 18-digit fixed-point decimals for rates and prices ([`Dec`])
//! - Canonical coin sets with a single merge rule ([`Coins`])

pub mod coin;
pub mod dec;
pub mod int;

pub use coin::{validate_denom, Coin, Coins, DecCoin, DecCoins};
pub use dec::Dec;
pub use int::Int;

use crate::error::{Classify, ErrorClass};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoinError {
    #[error("invalid integer amount '{0}'")]
    InvalidInteger(String),

    #[error("invalid decimal amount '{0}'")]
    InvalidDecimal(String),

    #[error("invalid coin expression '{0}'")]
    InvalidCoin(String),

    #[error("invalid denomination '{0}'")]
    InvalidDenom(String),

    #[error("duplicate denomination '{0}'")]
    DuplicateDenom(String),

    #[error("amount must not be empty")]
    Empty,

    #[error("amount overflows 256 bits")]
    Overflow,
}

impl Classify for CoinError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Validation
    }
}
