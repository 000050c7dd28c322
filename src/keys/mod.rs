//! Key registry.
//!
//! # Responsibilities
//! - Derive secp256k1 keys from BIP-39 mnemonics under BIP-44 paths
//! - Render one key under the account, validator and consensus prefixes
//! - Create, list, show, delete and sign with keys held in the encrypted keyring
//!
//! # Design Decisions
//! - Every registry operation opens exactly one credential handle and closes it
//!   before returning
//! - Mnemonics are returned once, on creation, and never stored
//! - Range and format checks run before the keyring is touched

pub mod address;
pub mod derivation;
pub mod registry;
pub mod types;

pub use address::{AddressKind, Material};
pub use derivation::{DerivedKey, MAX_HD_INDEX};
pub use registry::KeyRegistry;
pub use types::{KeyOutput, NewKey};

use crate::error::{Classify, ErrorClass};
use crate::keystore::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key name must not be empty")]
    EmptyName,

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("invalid account number {0}")]
    InvalidAccount(i64),

    #[error("invalid index number {0}")]
    InvalidIndex(i64),

    #[error("invalid mnemonic")]
    InvalidMnemonic,

    #[error("invalid Bech32 prefix encoding provided: {0}")]
    InvalidAddressKind(String),

    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("key {0} already exists")]
    AlreadyExists(String),

    #[error("The specified item could not be found in the keyring: {0}")]
    NotFound(String),

    #[error("invalid account password")]
    WrongPassword,

    #[error("failed to open keyring: {0}")]
    Open(#[source] StoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("stored key is malformed: {0}")]
    MalformedKey(String),

    #[error("bech32 encoding failed: {0}")]
    Bech32(String),

    #[error("keyring task failed: {0}")]
    Task(String),
}

impl Classify for KeyError {
    fn class(&self) -> ErrorClass {
        match self {
            KeyError::EmptyName
            | KeyError::EmptyPassword
            | KeyError::InvalidAccount(_)
            | KeyError::InvalidIndex(_)
            | KeyError::InvalidMnemonic
            | KeyError::InvalidAddressKind(_)
            | KeyError::InvalidAddress { .. }
            | KeyError::AlreadyExists(_) => ErrorClass::Validation,
            KeyError::NotFound(_) => ErrorClass::NotFound,
            KeyError::WrongPassword => ErrorClass::Auth,
            KeyError::Store(inner) => inner.class(),
            KeyError::Open(_)
            | KeyError::Derivation(_)
            | KeyError::MalformedKey(_)
            | KeyError::Bech32(_)
            | KeyError::Task(_) => ErrorClass::Internal,
        }
    }
}
