//! Terra key server library.
//!
//! Holds secp256k1 keys in an encrypted local keyring and exposes them over
//! HTTP: key management, building bank sends with node-computed fees, signing,
//! and the JSON/protobuf transaction codec.

// Core subsystems
pub mod bridge;
pub mod chain;
pub mod coins;
pub mod keys;
pub mod keystore;
pub mod node;
pub mod tx;

// Surface
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use chain::ChainProfile;
pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
