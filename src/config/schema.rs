//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the key server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the key server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// On-disk secret store settings.
    pub keystore: KeystoreConfig,

    /// Consensus node RPC endpoint.
    pub node: NodeConfig,

    /// Chain parameters (address prefixes, coin type, denominations).
    pub chain: ChainConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Secret store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeystoreConfig {
    /// Directory holding the encrypted keyring file.
    pub dir: String,

    /// Key-derivation cost used when the keyring is (re-)encrypted.
    pub kdf: KdfConfig,
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        Self {
            dir: "./keys".to_string(),
            kdf: KdfConfig::default(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct KdfConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,

    /// Number of passes.
    pub iterations: u32,

    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Consensus node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Tendermint RPC endpoint URL.
    pub rpc_url: String,

    /// RPC request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:26657".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Chain parameters. Sealed into a `ChainProfile` at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Base Bech32 prefix; role prefixes are derived from it.
    pub bech32_prefix: String,

    /// BIP-44 coin type.
    pub coin_type: u32,

    /// Native staking denomination (exempt from tax).
    pub native_denom: String,

    /// Gas limit used for the throwaway simulation transaction.
    pub default_gas_limit: u64,

    /// Signing mode: "direct" or "legacy_amino_json".
    pub sign_mode: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            bech32_prefix: "terra".to_string(),
            coin_type: 330,
            native_denom: "uluna".to_string(),
            default_gas_limit: 200_000,
            sign_mode: "direct".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.chain.coin_type, 330);
        assert_eq!(config.chain.native_denom, "uluna");
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert!(config.listener.tls.is_none());
    }

    #[test]
    fn test_partial_section_override() {
        let config: ServerConfig = toml::from_str(
            r#"
            [keystore]
            dir = "/var/lib/keyserver"

            [keystore.kdf]
            memory_kib = 64

            [chain]
            sign_mode = "legacy_amino_json"
            "#,
        )
        .unwrap();
        assert_eq!(config.keystore.dir, "/var/lib/keyserver");
        assert_eq!(config.keystore.kdf.memory_kib, 64);
        assert_eq!(config.keystore.kdf.iterations, 2);
        assert_eq!(config.chain.sign_mode, "legacy_amino_json");
        assert_eq!(config.chain.bech32_prefix, "terra");
    }
}
