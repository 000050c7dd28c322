//! Human-readable (JSON) transaction form.
//!
//! Mirrors the Cosmos SDK JSON encoding of `cosmos.tx.v1beta1.Tx`: 64-bit
//! integers are strings, bytes are base64, messages and public keys carry an
//! `@type` discriminator.

use serde::{Deserialize, Serialize};

use crate::chain::SignMode;
use crate::coins::Coin;

pub const MSG_SEND_TYPE_URL: &str = "/cosmos.bank.v1beta1.MsgSend";
pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    #[serde(default)]
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBody {
    pub messages: Vec<Msg>,
    #[serde(default)]
    pub memo: String,
    #[serde(default, with = "u64_string")]
    pub timeout_height: u64,
}

/// Supported messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum Msg {
    #[serde(rename = "/cosmos.bank.v1beta1.MsgSend")]
    Send(MsgSend),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    #[serde(default)]
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Fee,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    #[serde(default)]
    pub public_key: Option<PublicKey>,
    pub mode_info: ModeInfo,
    #[serde(default, with = "u64_string")]
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(rename = "@type")]
    pub type_url: String,
    /// Base64 of the compressed key.
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeInfo {
    pub single: Single,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Single {
    pub mode: SignMode,
}

impl ModeInfo {
    pub fn single(mode: SignMode) -> Self {
        Self {
            single: Single { mode },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    #[serde(default)]
    pub amount: Vec<Coin>,
    #[serde(with = "u64_string")]
    pub gas_limit: u64,
    #[serde(default)]
    pub payer: String,
    #[serde(default)]
    pub granter: String,
}

/// `u64` as a JSON string; numbers are accepted on input.
pub mod u64_string {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        struct U64Visitor;

        impl Visitor<'_> for U64Visitor {
            type Value = u64;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an unsigned 64-bit integer or numeric string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
                Ok(v)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(U64Visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNED: &str = r#"{
        "body": {
            "messages": [{
                "@type": "/cosmos.bank.v1beta1.MsgSend",
                "from_address": "terra1c76v9qw4x3h48pxchve2krxmydwrkyxz3kqfjh",
                "to_address": "terra1c76v9qw4x3h48pxchve2krxmydwrkyxz3kqfjh",
                "amount": [{"denom": "uluna", "amount": "1000"}]
            }],
            "memo": "hello",
            "timeout_height": "0"
        },
        "auth_info": {
            "signer_infos": [{
                "public_key": {"@type": "/cosmos.crypto.secp256k1.PubKey", "key": "AvJliUFS9x4AEvSJTW2x6LQNy0HeJ6hTwtZvq47jaGdw"},
                "mode_info": {"single": {"mode": "SIGN_MODE_DIRECT"}},
                "sequence": "4"
            }],
            "fee": {"amount": [{"denom": "uluna", "amount": "2000"}], "gas_limit": "100000", "payer": "", "granter": ""}
        },
        "signatures": ["AAAA"]
    }"#;

    #[test]
    fn test_parse_sdk_json() {
        let tx: Tx = serde_json::from_str(SIGNED).unwrap();
        let Msg::Send(send) = &tx.body.messages[0];
        assert_eq!(send.amount[0].amount.to_string(), "1000");
        assert_eq!(tx.auth_info.signer_infos[0].sequence, 4);
        assert_eq!(tx.auth_info.signer_infos[0].mode_info.single.mode, SignMode::Direct);
        assert_eq!(tx.auth_info.fee.gas_limit, 100_000);
    }

    #[test]
    fn test_integers_render_as_strings() {
        let tx: Tx = serde_json::from_str(SIGNED).unwrap();
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["auth_info"]["fee"]["gas_limit"], "100000");
        assert_eq!(value["auth_info"]["signer_infos"][0]["sequence"], "4");
        assert_eq!(value["body"]["messages"][0]["@type"], MSG_SEND_TYPE_URL);
    }

    #[test]
    fn test_unknown_message_type_rejected() {
        let bad = SIGNED.replace("/cosmos.bank.v1beta1.MsgSend", "/cosmos.staking.v1beta1.MsgDelegate");
        assert!(serde_json::from_str::<Tx>(&bad).is_err());
    }
}
