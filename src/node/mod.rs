//! Consensus node access.
//!
//! # Data Flow
//! ```text
//! FeeOracle (tax rate, tax cap, simulate)
//!     → NodeQuery::abci_query(path, bytes)
//!     → TendermintRpc (JSON-RPC over HTTP)
//!     → AbciResponse { code, log, value }
//! ```
//!
//! # Design Decisions
//! - The transport is a trait so tests can script node replies
//! - No retries; one query per call, bounded by the RPC timeout
//! - A non-zero response code carries the node log verbatim

pub mod oracle;
pub mod query;
pub mod rpc;

pub use oracle::FeeOracle;
pub use query::{AbciResponse, BroadcastResult, NodeQuery};
pub use rpc::TendermintRpc;

use crate::error::{Classify, ErrorClass};

/// Failure reaching the node or reading its reply.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("node request failed: {0}")]
    Http(String),

    #[error("node request timed out")]
    Timeout,

    #[error("node RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed node reply: {0}")]
    Decode(String),
}

impl Classify for TransportError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Upstream
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("query {path} failed: {source}")]
    Transport {
        path: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("{log}")]
    Rejected { path: &'static str, log: String },

    #[error("query {path} returned an undecodable value: {reason}")]
    Decode { path: &'static str, reason: String },
}

impl Classify for OracleError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Upstream
    }
}
