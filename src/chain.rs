//! Chain profile: the process-wide address and codec parameters.
//!
//! Built once from [`ChainConfig`] at startup, wrapped in an `Arc` and handed
//! to every component that renders addresses or prices transactions. Nothing
//! mutates it afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ChainConfig;

/// Signing mode used when producing sign bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignMode {
    /// Protobuf `SignDoc`.
    #[serde(rename = "SIGN_MODE_DIRECT")]
    Direct,
    /// Sorted amino JSON `StdSignDoc`.
    #[serde(rename = "SIGN_MODE_LEGACY_AMINO_JSON")]
    LegacyAminoJson,
}

impl SignMode {
    /// Protobuf enum value (`cosmos.tx.signing.v1beta1.SignMode`).
    pub fn as_proto(self) -> i32 {
        match self {
            SignMode::Direct => 1,
            SignMode::LegacyAminoJson => 127,
        }
    }

    pub fn from_proto(value: i32) -> Option<Self> {
        match value {
            1 => Some(SignMode::Direct),
            127 => Some(SignMode::LegacyAminoJson),
            _ => None,
        }
    }

    /// Name used in the JSON transaction form.
    pub fn as_json_name(self) -> &'static str {
        match self {
            SignMode::Direct => "SIGN_MODE_DIRECT",
            SignMode::LegacyAminoJson => "SIGN_MODE_LEGACY_AMINO_JSON",
        }
    }

    pub fn from_json_name(name: &str) -> Option<Self> {
        match name {
            "SIGN_MODE_DIRECT" => Some(SignMode::Direct),
            "SIGN_MODE_LEGACY_AMINO_JSON" => Some(SignMode::LegacyAminoJson),
            _ => None,
        }
    }
}

impl FromStr for SignMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(SignMode::Direct),
            "legacy_amino_json" | "amino-json" => Ok(SignMode::LegacyAminoJson),
            other => Err(format!("unknown sign mode '{other}'")),
        }
    }
}

impl fmt::Display for SignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_json_name())
    }
}

/// Bech32 human-readable prefixes for one address role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixPair {
    pub address: String,
    pub pubkey: String,
}

/// Immutable chain parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainProfile {
    pub account: PrefixPair,
    pub validator: PrefixPair,
    pub consensus: PrefixPair,
    pub coin_type: u32,
    pub native_denom: String,
    pub default_gas_limit: u64,
    pub sign_mode: SignMode,
}

impl ChainProfile {
    /// Seal a validated chain configuration.
    pub fn from_config(config: &ChainConfig) -> Result<Self, String> {
        Ok(Self::new(
            &config.bech32_prefix,
            config.coin_type,
            &config.native_denom,
            config.default_gas_limit,
            config.sign_mode.parse()?,
        ))
    }

    pub fn new(
        base_prefix: &str,
        coin_type: u32,
        native_denom: &str,
        default_gas_limit: u64,
        sign_mode: SignMode,
    ) -> Self {
        let pair = |suffix: &str| PrefixPair {
            address: format!("{base_prefix}{suffix}"),
            pubkey: format!("{base_prefix}{suffix}pub"),
        };

        Self {
            account: pair(""),
            validator: pair("valoper"),
            consensus: pair("valcons"),
            coin_type,
            native_denom: native_denom.to_string(),
            default_gas_limit,
            sign_mode,
        }
    }

    /// Terra mainnet parameters.
    pub fn terra() -> Self {
        Self::new("terra", 330, "uluna", 200_000, SignMode::Direct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terra_prefixes() {
        let profile = ChainProfile::terra();
        assert_eq!(profile.account.address, "terra");
        assert_eq!(profile.account.pubkey, "terrapub");
        assert_eq!(profile.validator.address, "terravaloper");
        assert_eq!(profile.validator.pubkey, "terravaloperpub");
        assert_eq!(profile.consensus.address, "terravalcons");
        assert_eq!(profile.consensus.pubkey, "terravalconspub");
        assert_eq!(profile.coin_type, 330);
    }

    #[test]
    fn test_sign_mode_names() {
        for mode in [SignMode::Direct, SignMode::LegacyAminoJson] {
            assert_eq!(SignMode::from_proto(mode.as_proto()), Some(mode));
            assert_eq!(SignMode::from_json_name(mode.as_json_name()), Some(mode));
        }
        assert!("textual".parse::<SignMode>().is_err());
    }
}
