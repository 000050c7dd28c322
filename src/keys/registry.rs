//! Keyring-backed key registry.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};

use crate::bridge::CredentialHandle;
use crate::chain::ChainProfile;
use crate::config::KdfConfig;
use crate::keys::address::{AddressKind, PUBKEY_LEN};
use crate::keys::derivation::{self, DerivedKey, MAX_HD_INDEX};
use crate::keys::types::{KeyOutput, NewKey};
use crate::keys::KeyError;
use crate::keystore::{Keyring, StoreError, StoredKey};
use crate::observability::metrics;

/// How a wrong password is reported for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PasswordFailure {
    /// Reads and key creation: any open failure is internal.
    Internal,
    /// Password-gated mutations: a wrong password is an auth failure.
    Auth,
}

/// Key operations over the keyring in one directory.
///
/// Holds no open store between calls. Every method feeds the password through
/// a fresh [`CredentialHandle`], does its work and closes the handle before
/// returning. Clones share one lock, so open, mutate and persist run as a
/// single step per keyring.
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    dir: PathBuf,
    kdf: KdfConfig,
    profile: Arc<ChainProfile>,
    lock: Arc<Mutex<()>>,
}

impl KeyRegistry {
    pub fn new(dir: impl Into<PathBuf>, kdf: KdfConfig, profile: Arc<ChainProfile>) -> Self {
        Self {
            dir: dir.into(),
            kdf,
            profile,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn profile(&self) -> &ChainProfile {
        &self.profile
    }

    fn with_store<T>(
        &self,
        password: &SecretString,
        on_wrong_password: PasswordFailure,
        work: impl FnOnce(&mut Keyring) -> Result<T, KeyError>,
    ) -> Result<T, KeyError> {
        if password.expose_secret().is_empty() {
            return Err(KeyError::EmptyPassword);
        }

        // Held until the handle is closed.
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let dir = self.dir.clone();
        let kdf = self.kdf;
        let opened = CredentialHandle::open(password, |input| Keyring::open(&dir, kdf, input));

        metrics::record_store_open(opened.is_ok());

        let mut handle = opened.map_err(|e| match (e, on_wrong_password) {
            (StoreError::WrongPassphrase, PasswordFailure::Auth) => KeyError::WrongPassword,
            (e @ StoreError::MultiLinePassphrase, _) => KeyError::Store(e),
            (e, _) => KeyError::Open(e),
        })?;

        let result = work(handle.store_mut());
        handle.close();
        result
    }

    /// All keys, ordered by name, rendered with account prefixes.
    pub fn list(&self, password: &SecretString) -> Result<Vec<KeyOutput>, KeyError> {
        self.with_store(password, PasswordFailure::Internal, |ring| {
            ring.keys()
                .map(|key| {
                    let public = decode_public(key)?;
                    KeyOutput::new(&key.name, &public, AddressKind::Account, &self.profile)
                })
                .collect()
        })
    }

    /// Derive and store a new key. The output carries the mnemonic.
    pub fn create(&self, password: &SecretString, request: NewKey) -> Result<KeyOutput, KeyError> {
        if request.name.is_empty() {
            return Err(KeyError::EmptyName);
        }
        if !(0..=MAX_HD_INDEX).contains(&request.account) {
            return Err(KeyError::InvalidAccount(request.account));
        }
        if !(0..=MAX_HD_INDEX).contains(&request.index) {
            return Err(KeyError::InvalidIndex(request.index));
        }
        let account = u32::try_from(request.account).map_err(|_| KeyError::InvalidAccount(request.account))?;
        let index = u32::try_from(request.index).map_err(|_| KeyError::InvalidIndex(request.index))?;

        let mnemonic = match request.mnemonic.as_deref().map(str::trim) {
            Some(phrase) if !phrase.is_empty() => derivation::parse_mnemonic(phrase)?,
            _ => derivation::generate_mnemonic()?,
        };

        self.with_store(password, PasswordFailure::Internal, |ring| {
            if ring.contains(&request.name) {
                return Err(KeyError::AlreadyExists(request.name.clone()));
            }

            let hd_path = derivation::hd_path(self.profile.coin_type, account, index);
            let derived = DerivedKey::from_mnemonic(&mnemonic, &hd_path)?;
            ring.insert(StoredKey {
                name: request.name.clone(),
                hd_path,
                private_key: derived.private_hex().to_string(),
                public_key: hex::encode(derived.public_key()),
            })?;

            tracing::info!(name = %request.name, account, index, "Key created");

            let mut output = KeyOutput::new(
                &request.name,
                derived.public_key(),
                AddressKind::Account,
                &self.profile,
            )?;
            output.mnemonic = Some(mnemonic.to_string());
            Ok(output)
        })
    }

    /// One key rendered under the prefixes for `kind` ("acc", "val", "cons" or the long names).
    pub fn get(&self, password: &SecretString, name: &str, kind: &str) -> Result<KeyOutput, KeyError> {
        let kind: AddressKind = kind.parse()?;
        self.with_store(password, PasswordFailure::Internal, |ring| {
            let key = ring
                .get(name)
                .ok_or_else(|| KeyError::NotFound(name.to_string()))?;
            KeyOutput::new(&key.name, &decode_public(key)?, kind, &self.profile)
        })
    }

    pub fn delete(&self, password: &SecretString, name: &str) -> Result<(), KeyError> {
        self.with_store(password, PasswordFailure::Auth, |ring| {
            ring.remove(name).map_err(|e| match e {
                StoreError::NotFound(name) => KeyError::NotFound(name),
                other => KeyError::Store(other),
            })?;
            tracing::info!(name = %name, "Key deleted");
            Ok(())
        })
    }

    /// Re-encrypt the keyring under `new`. `name` must exist in the keyring.
    pub fn update_password(
        &self,
        name: &str,
        old: &SecretString,
        new: &SecretString,
    ) -> Result<(), KeyError> {
        self.with_store(old, PasswordFailure::Auth, |ring| {
            if !ring.contains(name) {
                return Err(KeyError::NotFound(name.to_string()));
            }
            ring.change_passphrase(new)?;
            tracing::info!(name = %name, "Keyring password updated");
            Ok(())
        })
    }

    /// Compressed public key of `name`.
    pub fn public_key(&self, password: &SecretString, name: &str) -> Result<[u8; PUBKEY_LEN], KeyError> {
        self.with_store(password, PasswordFailure::Internal, |ring| {
            let key = ring
                .get(name)
                .ok_or_else(|| KeyError::NotFound(name.to_string()))?;
            decode_public(key)
        })
    }

    /// 64-byte low-S signature by `name` over SHA-256 of `msg`.
    pub fn sign(&self, password: &SecretString, name: &str, msg: &[u8]) -> Result<Vec<u8>, KeyError> {
        self.with_store(password, PasswordFailure::Internal, |ring| {
            let key = ring
                .get(name)
                .ok_or_else(|| KeyError::NotFound(name.to_string()))?;
            let signer = DerivedKey::from_private_hex(&key.private_key)?;
            Ok(signer.sign(msg))
        })
    }
}

fn decode_public(key: &StoredKey) -> Result<[u8; PUBKEY_LEN], KeyError> {
    hex::decode(&key.public_key)
        .map_err(|e| KeyError::MalformedKey(e.to_string()))?
        .try_into()
        .map_err(|_| KeyError::MalformedKey(format!("public key of '{}' has wrong length", key.name)))
}
