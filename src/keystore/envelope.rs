//! Encrypted keyring envelope: Argon2id key derivation plus AES-256-GCM.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::config::KdfConfig;
use crate::keystore::StoreError;

pub const ENVELOPE_VERSION: u32 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfParams {
    pub salt: String,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// On-disk form of the keyring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub kdf: KdfParams,
    pub nonce: String,
    pub ciphertext: String,
}

fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
) -> Result<Zeroizing<[u8; KEY_LEN]>, StoreError> {
    let params = Params::new(memory_kib, iterations, parallelism, Some(KEY_LEN))
        .map_err(|e| StoreError::Crypto(format!("kdf parameters: {e}")))?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon
        .hash_password_into(passphrase, salt, &mut key[..])
        .map_err(|e| StoreError::Crypto(format!("kdf: {e}")))?;
    Ok(key)
}

impl Envelope {
    /// Encrypt `plaintext` under a key derived from `passphrase` with fresh salt and nonce.
    pub fn seal(plaintext: &[u8], passphrase: &[u8], kdf: KdfConfig) -> Result<Self, StoreError> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);

        let key = derive_key(passphrase, &salt, kdf.memory_kib, kdf.iterations, kdf.parallelism)?;
        let cipher = Aes256Gcm::new_from_slice(&key[..])
            .map_err(|e| StoreError::Crypto(format!("cipher key: {e}")))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| StoreError::Crypto("encryption failed".to_string()))?;

        Ok(Self {
            version: ENVELOPE_VERSION,
            kdf: KdfParams {
                salt: B64.encode(salt),
                memory_kib: kdf.memory_kib,
                iterations: kdf.iterations,
                parallelism: kdf.parallelism,
            },
            nonce: B64.encode(nonce),
            ciphertext: B64.encode(ciphertext),
        })
    }

    /// Decrypt with `passphrase`. An authentication failure means the passphrase is wrong.
    pub fn open(&self, passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>, StoreError> {
        if self.version != ENVELOPE_VERSION {
            return Err(StoreError::Corrupt(format!(
                "unsupported keyring version {}",
                self.version
            )));
        }

        let decode = |field: &str, value: &str| {
            B64.decode(value)
                .map_err(|e| StoreError::Corrupt(format!("{field}: {e}")))
        };
        let salt = decode("kdf.salt", &self.kdf.salt)?;
        let nonce = decode("nonce", &self.nonce)?;
        let ciphertext = decode("ciphertext", &self.ciphertext)?;
        if nonce.len() != NONCE_LEN {
            return Err(StoreError::Corrupt(format!("nonce must be {NONCE_LEN} bytes")));
        }

        let key = derive_key(
            passphrase,
            &salt,
            self.kdf.memory_kib,
            self.kdf.iterations,
            self.kdf.parallelism,
        )?;
        let cipher = Aes256Gcm::new_from_slice(&key[..])
            .map_err(|e| StoreError::Crypto(format!("cipher key: {e}")))?;
        cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
            .map(Zeroizing::new)
            .map_err(|_| StoreError::WrongPassphrase)
    }
}
