//! Node query channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::node::TransportError;

/// Result of an ABCI query as the node reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbciResponse {
    pub code: u32,
    pub log: String,
    pub value: Vec<u8>,
}

impl AbciResponse {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// Outcome of a synchronous broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    pub txhash: String,
    pub code: u32,
    pub raw_log: String,
}

/// Path + bytes in, bytes + status + log out.
#[async_trait]
pub trait NodeQuery: Send + Sync {
    async fn abci_query(&self, path: &str, data: &[u8]) -> Result<AbciResponse, TransportError>;

    async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<BroadcastResult, TransportError>;
}
