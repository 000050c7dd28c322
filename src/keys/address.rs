//! Role-specific Bech32 encodings of one public key.

use std::str::FromStr;

use bech32::{Bech32, Hrp};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::chain::{ChainProfile, PrefixPair};
use crate::keys::KeyError;

/// Amino type prefix of a secp256k1 public key.
pub const AMINO_SECP256K1_PREFIX: [u8; 5] = [0xeb, 0x5a, 0xe9, 0x87, 0x21];

/// Length of a compressed secp256k1 public key.
pub const PUBKEY_LEN: usize = 33;

/// Which prefix pair an output uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressKind {
    #[default]
    Account,
    Validator,
    Consensus,
}

impl AddressKind {
    pub fn prefixes(self, profile: &ChainProfile) -> &PrefixPair {
        match self {
            AddressKind::Account => &profile.account,
            AddressKind::Validator => &profile.validator,
            AddressKind::Consensus => &profile.consensus,
        }
    }
}

impl FromStr for AddressKind {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "acc" | "account" => Ok(AddressKind::Account),
            "val" | "validator" => Ok(AddressKind::Validator),
            "cons" | "consensus" => Ok(AddressKind::Consensus),
            other => Err(KeyError::InvalidAddressKind(other.to_string())),
        }
    }
}

/// What is being encoded.
#[derive(Debug, Clone, Copy)]
pub enum Material<'a> {
    /// 20-byte address.
    Address(&'a [u8]),
    /// Compressed public key; amino-prefixed before encoding.
    PublicKey(&'a [u8; PUBKEY_LEN]),
}

/// RIPEMD160(SHA256(pubkey)).
pub fn address_bytes(pubkey: &[u8; PUBKEY_LEN]) -> [u8; 20] {
    let sha = Sha256::digest(pubkey);
    let mut out = [0u8; 20];
    out.copy_from_slice(&Ripemd160::digest(sha));
    out
}

/// Encode `material` under the prefix pair of `prefixes`.
pub fn encode(material: Material<'_>, prefixes: &PrefixPair) -> Result<String, KeyError> {
    let (hrp, data) = match material {
        Material::Address(bytes) => (&prefixes.address, bytes.to_vec()),
        Material::PublicKey(key) => {
            let mut data = Vec::with_capacity(AMINO_SECP256K1_PREFIX.len() + PUBKEY_LEN);
            data.extend_from_slice(&AMINO_SECP256K1_PREFIX);
            data.extend_from_slice(key);
            (&prefixes.pubkey, data)
        }
    };
    let hrp = Hrp::parse(hrp).map_err(|e| KeyError::Bech32(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, &data).map_err(|e| KeyError::Bech32(e.to_string()))
}

/// Decode a Bech32 address, requiring the given human-readable part.
pub fn decode_address(address: &str, expected_hrp: &str) -> Result<Vec<u8>, KeyError> {
    let invalid = |reason: String| KeyError::InvalidAddress {
        address: address.to_string(),
        reason,
    };
    let (hrp, data) = bech32::decode(address).map_err(|e| invalid(e.to_string()))?;
    if hrp.as_str() != expected_hrp {
        return Err(invalid(format!("expected prefix '{expected_hrp}'")));
    }
    if data.len() != 20 && data.len() != 32 {
        return Err(invalid(format!("unexpected length {}", data.len())));
    }
    Ok(data)
}
