//! Password-protected keyring file.
//!
//! The keyring behaves like a terminal-driven store: [`Keyring::open`] reads
//! the passphrase as a line from its input and decrypts the whole file into
//! memory. Every mutation re-encrypts and atomically replaces the file.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, Write};

use tempfile::NamedTempFile;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::KdfConfig;
use crate::keystore::envelope::Envelope;
use crate::keystore::StoreError;

pub const KEYRING_FILE: &str = "keyring.json";

/// Minimum passphrase length for a new store or a rotated passphrase.
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// One stored key. Secret material is hex and wiped on drop.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct StoredKey {
    pub name: String,
    pub hd_path: String,
    pub private_key: String,
    pub public_key: String,
}

impl std::fmt::Debug for StoredKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredKey")
            .field("name", &self.name)
            .field("hd_path", &self.hd_path)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Decrypted keyring, alive for one request.
pub struct Keyring {
    path: PathBuf,
    kdf: KdfConfig,
    passphrase: Zeroizing<String>,
    exists: bool,
    keys: BTreeMap<String, StoredKey>,
}

impl std::fmt::Debug for Keyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyring")
            .field("path", &self.path)
            .field("keys", &self.keys.len())
            .finish_non_exhaustive()
    }
}

/// Read one passphrase line, dropping the line terminator. Anything after the
/// first line rejects the passphrase instead of being ignored.
fn read_passphrase(input: &mut dyn BufRead) -> Result<Zeroizing<String>, StoreError> {
    let mut line = Zeroizing::new(String::new());
    input.read_line(&mut line)?;
    let mut rest = Zeroizing::new(Vec::new());
    input.read_to_end(&mut rest)?;
    if !rest.is_empty() {
        return Err(StoreError::MultiLinePassphrase);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    if line.is_empty() {
        return Err(StoreError::NoPassphrase);
    }
    Ok(line)
}

impl Keyring {
    /// Open the keyring in `dir`, reading the passphrase from `input`.
    ///
    /// A missing keyring file is an empty store that will be created on the
    /// first write.
    pub fn open(dir: &Path, kdf: KdfConfig, input: &mut dyn BufRead) -> Result<Self, StoreError> {
        let passphrase = read_passphrase(input)?;
        let path = dir.join(KEYRING_FILE);

        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    path,
                    kdf,
                    passphrase,
                    exists: false,
                    keys: BTreeMap::new(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let envelope: Envelope =
            serde_json::from_slice(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let plain = envelope.open(passphrase.as_bytes())?;
        let keys: BTreeMap<String, StoredKey> =
            serde_json::from_slice(&plain).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        Ok(Self {
            path,
            kdf,
            passphrase,
            exists: true,
            keys,
        })
    }

    /// Stored keys, ordered by name.
    pub fn keys(&self) -> impl Iterator<Item = &StoredKey> {
        self.keys.values()
    }

    pub fn get(&self, name: &str) -> Option<&StoredKey> {
        self.keys.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    pub fn insert(&mut self, key: StoredKey) -> Result<(), StoreError> {
        if self.keys.contains_key(&key.name) {
            return Err(StoreError::Duplicate(key.name.clone()));
        }
        if !self.exists && self.passphrase.len() < MIN_PASSPHRASE_LEN {
            return Err(StoreError::PassphraseTooShort(MIN_PASSPHRASE_LEN));
        }
        let name = key.name.clone();
        self.keys.insert(name.clone(), key);
        if let Err(e) = self.persist() {
            self.keys.remove(&name);
            return Err(e);
        }
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        let removed = self
            .keys
            .remove(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        if let Err(e) = self.persist() {
            self.keys.insert(name.to_string(), removed);
            return Err(e);
        }
        Ok(())
    }

    /// Re-encrypt the whole keyring under `new`.
    pub fn change_passphrase(&mut self, new: &SecretString) -> Result<(), StoreError> {
        if new.expose_secret().len() < MIN_PASSPHRASE_LEN {
            return Err(StoreError::PassphraseTooShort(MIN_PASSPHRASE_LEN));
        }
        let previous = std::mem::replace(
            &mut self.passphrase,
            Zeroizing::new(new.expose_secret().to_string()),
        );
        if let Err(e) = self.persist() {
            self.passphrase = previous;
            return Err(e);
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let plain = Zeroizing::new(
            serde_json::to_vec(&self.keys).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        );
        let envelope = Envelope::seal(&plain, self.passphrase.as_bytes(), self.kdf)?;
        let body =
            serde_json::to_vec_pretty(&envelope).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(dir) => dir,
            None => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        self.exists = true;
        Ok(())
    }
}
