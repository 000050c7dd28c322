//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, KDF cost, addresses parse)
//! - Validate chain parameters before they are sealed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::chain::SignMode;
use crate::config::schema::ServerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.keystore.dir.trim().is_empty() {
        errors.push(ValidationError::new("keystore.dir", "must not be empty"));
    }

    // argon2 rejects m < 8 * p
    let kdf = &config.keystore.kdf;
    if kdf.iterations == 0 {
        errors.push(ValidationError::new("keystore.kdf.iterations", "must be > 0"));
    }
    if kdf.parallelism == 0 {
        errors.push(ValidationError::new("keystore.kdf.parallelism", "must be > 0"));
    } else if kdf.memory_kib < 8 * kdf.parallelism {
        errors.push(ValidationError::new(
            "keystore.kdf.memory_kib",
            "must be at least 8 KiB per lane",
        ));
    }

    if url::Url::parse(&config.node.rpc_url).is_err() {
        errors.push(ValidationError::new(
            "node.rpc_url",
            format!("'{}' is not a valid URL", config.node.rpc_url),
        ));
    }
    if config.node.timeout_secs == 0 {
        errors.push(ValidationError::new("node.timeout_secs", "must be > 0"));
    }

    let prefix = &config.chain.bech32_prefix;
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        errors.push(ValidationError::new(
            "chain.bech32_prefix",
            "must be a non-empty lowercase alphanumeric string",
        ));
    }
    if config.chain.coin_type >= 0x8000_0000 {
        errors.push(ValidationError::new("chain.coin_type", "must be below 2^31"));
    }
    if config.chain.native_denom.is_empty() {
        errors.push(ValidationError::new("chain.native_denom", "must not be empty"));
    }
    if config.chain.default_gas_limit == 0 {
        errors.push(ValidationError::new("chain.default_gas_limit", "must be > 0"));
    }
    if config.chain.sign_mode.parse::<SignMode>().is_err() {
        errors.push(ValidationError::new(
            "chain.sign_mode",
            format!("unknown sign mode '{}'", config.chain.sign_mode),
        ));
    }

    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::new("limits.request_timeout_secs", "must be > 0"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a socket address",
        ));
    }
    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            "must be 'pretty' or 'json'",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "nope".into();
        config.chain.sign_mode = "textual".into();
        config.keystore.kdf.iterations = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["listener.bind_address", "keystore.kdf.iterations", "chain.sign_mode"]
        );
    }

    #[test]
    fn test_rejects_uppercase_prefix() {
        let mut config = ServerConfig::default();
        config.chain.bech32_prefix = "Terra".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "chain.bech32_prefix");
    }
}
