//! BIP-39 mnemonics and BIP-32/44 secp256k1 derivation.

use std::str::FromStr;

use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use k256::ecdsa::signature::Signer;
use k256::ecdsa::{Signature, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::keys::address::PUBKEY_LEN;
use crate::keys::KeyError;

/// Largest non-hardened BIP-32 index; also the bound for `account`.
pub const MAX_HD_INDEX: i64 = 0x7fff_ffff;

const MNEMONIC_ENTROPY_BYTES: usize = 32;

/// `m/44'/<coin_type>'/<account>'/0/<index>`
pub fn hd_path(coin_type: u32, account: u32, index: u32) -> String {
    format!("m/44'/{coin_type}'/{account}'/0/{index}")
}

/// Fresh 24-word English mnemonic.
pub fn generate_mnemonic() -> Result<Mnemonic, KeyError> {
    let mut entropy = Zeroizing::new([0u8; MNEMONIC_ENTROPY_BYTES]);
    OsRng.fill_bytes(entropy.as_mut_slice());
    Mnemonic::from_entropy(entropy.as_slice()).map_err(|e| KeyError::Derivation(e.to_string()))
}

/// Parse and checksum-verify an English mnemonic.
pub fn parse_mnemonic(phrase: &str) -> Result<Mnemonic, KeyError> {
    Mnemonic::parse_in_normalized(Language::English, phrase.trim())
        .map_err(|_| KeyError::InvalidMnemonic)
}

/// A derived secp256k1 key pair.
#[derive(Clone)]
pub struct DerivedKey {
    signing: SigningKey,
    public: [u8; PUBKEY_LEN],
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("public", &hex::encode(self.public))
            .finish_non_exhaustive()
    }
}

impl DerivedKey {
    /// Derive the key at `path` from a mnemonic with an empty BIP-39 passphrase.
    pub fn from_mnemonic(mnemonic: &Mnemonic, path: &str) -> Result<Self, KeyError> {
        let seed = Zeroizing::new(mnemonic.to_seed_normalized(""));
        let path = DerivationPath::from_str(path).map_err(|e| KeyError::Derivation(e.to_string()))?;
        let xprv = XPrv::derive_from_path(seed.as_slice(), &path)
            .map_err(|e| KeyError::Derivation(e.to_string()))?;
        Ok(Self::from_signing_key(xprv.private_key().clone()))
    }

    /// Rebuild from a stored hex private key.
    pub fn from_private_hex(private_hex: &str) -> Result<Self, KeyError> {
        let bytes = Zeroizing::new(
            hex::decode(private_hex).map_err(|e| KeyError::MalformedKey(e.to_string()))?,
        );
        let signing =
            SigningKey::from_slice(&bytes).map_err(|e| KeyError::MalformedKey(e.to_string()))?;
        Ok(Self::from_signing_key(signing))
    }

    fn from_signing_key(signing: SigningKey) -> Self {
        let point = signing.verifying_key().to_encoded_point(true);
        let mut public = [0u8; PUBKEY_LEN];
        public.copy_from_slice(point.as_bytes());
        Self { signing, public }
    }

    pub fn public_key(&self) -> &[u8; PUBKEY_LEN] {
        &self.public
    }

    pub fn private_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.signing.to_bytes()))
    }

    /// ECDSA over SHA-256 of `msg`, 64-byte `r || s` with low S.
    pub fn sign(&self, msg: &[u8]) -> Vec<u8> {
        let signature: Signature = self.signing.sign(msg);
        let signature = signature.normalize_s().unwrap_or(signature);
        signature.to_bytes().to_vec()
    }
}
