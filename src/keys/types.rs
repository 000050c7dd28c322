//! Key record types.

use serde::{Deserialize, Serialize};

use crate::chain::ChainProfile;
use crate::keys::address::{self, AddressKind, Material, PUBKEY_LEN};
use crate::keys::KeyError;

/// Public view of a stored key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyOutput {
    pub name: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub address: String,
    pub pubkey: String,
    /// Only present in the response that created the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
}

impl KeyOutput {
    pub fn new(
        name: &str,
        pubkey: &[u8; PUBKEY_LEN],
        kind: AddressKind,
        profile: &ChainProfile,
    ) -> Result<Self, KeyError> {
        let prefixes = kind.prefixes(profile);
        let addr = address::address_bytes(pubkey);
        Ok(Self {
            name: name.to_string(),
            key_type: "local".to_string(),
            address: address::encode(Material::Address(&addr), prefixes)?,
            pubkey: address::encode(Material::PublicKey(pubkey), prefixes)?,
            mnemonic: None,
        })
    }
}

/// Parameters for creating a key.
#[derive(Debug, Clone, Default)]
pub struct NewKey {
    pub name: String,
    pub mnemonic: Option<String>,
    pub account: i64,
    pub index: i64,
}
