//! Tendermint JSON-RPC transport.
//!
//! # Responsibilities
//! - `abci_query` with hex-encoded data and base64 result value
//! - `broadcast_tx_sync` with base64 transaction bytes
//! - Map HTTP, timeout and JSON-RPC failures onto [`TransportError`]

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::NodeConfig;
use crate::node::query::{AbciResponse, BroadcastResult, NodeQuery};
use crate::node::TransportError;

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AbciQueryResult {
    response: AbciQueryResponse,
}

#[derive(Debug, Deserialize)]
struct AbciQueryResponse {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BroadcastTxResponse {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    hash: String,
}

/// JSON-RPC client for a Tendermint node.
#[derive(Debug)]
pub struct TendermintRpc {
    client: reqwest::Client,
    url: url::Url,
    next_id: AtomicU64,
}

impl TendermintRpc {
    pub fn new(config: &NodeConfig) -> Result<Self, TransportError> {
        let url: url::Url = config
            .rpc_url
            .parse()
            .map_err(|e| TransportError::Http(format!("invalid RPC URL '{}': {e}", config.rpc_url)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        tracing::info!(rpc_url = %url, timeout_secs = config.timeout_secs, "Node RPC client initialized");

        Ok(Self {
            client,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Http(e.to_string())
                }
            })?;

        let envelope: RpcEnvelope<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        if let Some(err) = envelope.error {
            let message = match err.data {
                Some(data) if !data.is_empty() => format!("{}: {data}", err.message),
                _ => err.message,
            };
            return Err(TransportError::Rpc {
                code: err.code,
                message,
            });
        }
        envelope
            .result
            .ok_or_else(|| TransportError::Decode("response has neither result nor error".to_string()))
    }
}

#[async_trait]
impl NodeQuery for TendermintRpc {
    async fn abci_query(&self, path: &str, data: &[u8]) -> Result<AbciResponse, TransportError> {
        let params = json!({
            "path": path,
            "data": hex::encode(data),
            "height": "0",
            "prove": false,
        });
        let result: AbciQueryResult = self.call("abci_query", params).await?;

        let value = match result.response.value {
            Some(v) if !v.is_empty() => B64
                .decode(v)
                .map_err(|e| TransportError::Decode(format!("abci value: {e}")))?,
            _ => Vec::new(),
        };
        Ok(AbciResponse {
            code: result.response.code,
            log: result.response.log,
            value,
        })
    }

    async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<BroadcastResult, TransportError> {
        let params = json!({ "tx": B64.encode(tx_bytes) });
        let result: BroadcastTxResponse = self.call("broadcast_tx_sync", params).await?;
        Ok(BroadcastResult {
            txhash: result.hash,
            code: result.code,
            raw_log: result.log,
        })
    }
}
