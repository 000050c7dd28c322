//! Transactions.
//!
//! # Data Flow
//! ```text
//! SendRequest
//!     → TxAssembler (gas simulation, gas prices, tax via FeeOracle)
//!     → unsigned Tx (JSON)
//!     → SigningEngine (public key, sign bytes, signature via KeyRegistry)
//!     → signed Tx
//!     → codec::encode → TxRaw bytes → broadcast
//! ```
//!
//! # Design Decisions
//! - The JSON form in `model` is the only in-memory representation; protobuf
//!   types in `proto` exist only at the encoding boundary
//! - Fee sets are always built through `Coins`, so every fee is sorted by
//!   denomination with zero amounts dropped

pub mod amino;
pub mod assembler;
pub mod broadcast;
pub mod codec;
pub mod model;
pub mod proto;
pub mod signing;

pub use assembler::{SendRequest, TxAssembler};
pub use model::Tx;
pub use signing::{SignRequest, SigningEngine};

use crate::coins::CoinError;
use crate::error::{Classify, ErrorClass};
use crate::keys::KeyError;
use crate::node::{OracleError, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum TxError {
    #[error("GasPrices and Fees cannot be used at the same time")]
    FeesAndGasPrices,

    #[error("invalid gas value '{0}'")]
    InvalidGas(String),

    #[error("invalid gas adjustment '{0}'")]
    InvalidGasAdjustment(String),

    #[error("invalid account number '{0}'")]
    InvalidAccountNumber(String),

    #[error("invalid sequence '{0}'")]
    InvalidSequence(String),

    #[error("invalid transaction: {0}")]
    InvalidTx(String),

    #[error("failed to decode transaction: {0}")]
    Decode(String),

    #[error("unsupported type {0}")]
    UnsupportedType(String),

    #[error(transparent)]
    Coin(#[from] CoinError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("broadcast failed: {0}")]
    Broadcast(#[from] TransportError),
}

impl Classify for TxError {
    fn class(&self) -> ErrorClass {
        match self {
            TxError::FeesAndGasPrices
            | TxError::InvalidGas(_)
            | TxError::InvalidGasAdjustment(_)
            | TxError::InvalidAccountNumber(_)
            | TxError::InvalidSequence(_)
            | TxError::InvalidTx(_)
            | TxError::Decode(_)
            | TxError::UnsupportedType(_) => ErrorClass::Validation,
            TxError::Coin(inner) => inner.class(),
            TxError::Key(inner) => inner.class(),
            TxError::Oracle(inner) => inner.class(),
            TxError::Broadcast(inner) => inner.class(),
        }
    }
}
