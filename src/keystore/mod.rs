//! Encrypted on-disk keyring.
//!
//! # Responsibilities
//! - Read the passphrase from line-oriented input, as a terminal store would
//! - Decrypt, hold and re-encrypt the name -> key map
//! - Replace the keyring file atomically on every write, via a unique temp file
//!
//! # File Format
//! ```text
//! <dir>/keyring.json = { version, kdf{salt,memory_kib,iterations,parallelism}, nonce, ciphertext }
//! plaintext          = { "<name>": { name, hd_path, private_key, public_key }, ... }
//! ```

pub mod envelope;
pub mod store;

pub use envelope::Envelope;
pub use store::{Keyring, StoredKey, KEYRING_FILE, MIN_PASSPHRASE_LEN};

use crate::error::{Classify, ErrorClass};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("keyring I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("keyring is corrupt: {0}")]
    Corrupt(String),

    #[error("keyring crypto failure: {0}")]
    Crypto(String),

    #[error("invalid account passphrase")]
    WrongPassphrase,

    #[error("no passphrase supplied")]
    NoPassphrase,

    #[error("passphrase must be a single line")]
    MultiLinePassphrase,

    #[error("passphrase must be at least {0} characters")]
    PassphraseTooShort(usize),

    #[error("key '{0}' already exists")]
    Duplicate(String),

    #[error("key '{0}' not found")]
    NotFound(String),
}

impl Classify for StoreError {
    fn class(&self) -> ErrorClass {
        match self {
            StoreError::NoPassphrase
            | StoreError::MultiLinePassphrase
            | StoreError::PassphraseTooShort(_)
            | StoreError::Duplicate(_) => ErrorClass::Validation,
            StoreError::NotFound(_) => ErrorClass::NotFound,
            StoreError::Io(_)
            | StoreError::Corrupt(_)
            | StoreError::Crypto(_)
            | StoreError::WrongPassphrase => ErrorClass::Internal,
        }
    }
}
