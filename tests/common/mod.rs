//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use prost::Message;
use serde_json::Value;
use tower::ServiceExt;

use terra_keyserver::config::{KdfConfig, LimitsConfig};
use terra_keyserver::http::{build_router, AppState};
use terra_keyserver::keys::KeyRegistry;
use terra_keyserver::node::oracle::{CURRENT_EPOCH_PATH, SIMULATE_PATH, TAX_CAP_PATH, TAX_RATE_PATH};
use terra_keyserver::node::{AbciResponse, BroadcastResult, NodeQuery, TransportError};
use terra_keyserver::tx::proto;
use terra_keyserver::ChainProfile;

pub const MNEMONIC: &str = "marine intact tone element chest certain school village sound guilt nothing deposit cart skirt unveil bulk unit dust peasant cannon faith lyrics swear regret";
pub const PASSWORD: &str = "123456789";
pub const ADDRESS: &str = "terra1c76v9qw4x3h48pxchve2krxmydwrkyxz3kqfjh";
pub const PUBKEY: &str = "terrapub1addwnpepqtextz2p2tm3uqqj7jy56md3az6qmj6pmcn6s57z6eh6hrhrdpnhqtnky9k";

/// In-memory node with fixed fee parameters.
pub struct ScriptedNode {
    pub tax_rate: &'static str,
    pub caps: HashMap<&'static str, &'static str>,
    pub gas_used: u64,
    pub broadcasts: Mutex<Vec<Vec<u8>>>,
}

impl Default for ScriptedNode {
    fn default() -> Self {
        Self {
            tax_rate: "0.007",
            caps: HashMap::from([("uusd", "1000000"), ("ukrw", "1000")]),
            gas_used: 75_000,
            broadcasts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NodeQuery for ScriptedNode {
    async fn abci_query(&self, path: &str, data: &[u8]) -> Result<AbciResponse, TransportError> {
        let value = match path {
            CURRENT_EPOCH_PATH => b"\"1\"".to_vec(),
            TAX_RATE_PATH => format!("\"{}\"", self.tax_rate).into_bytes(),
            TAX_CAP_PATH => {
                let request: Value = serde_json::from_slice(data).unwrap();
                let denom = request["denom"].as_str().unwrap_or_default();
                match self.caps.get(denom) {
                    Some(cap) => format!("\"{cap}\"").into_bytes(),
                    None => {
                        return Ok(AbciResponse {
                            code: 18,
                            log: format!("invalid denom {denom}"),
                            value: Vec::new(),
                        })
                    }
                }
            }
            SIMULATE_PATH => proto::SimulateResponse {
                gas_info: Some(proto::GasInfo {
                    gas_wanted: 0,
                    gas_used: self.gas_used,
                }),
            }
            .encode_to_vec(),
            other => return Err(TransportError::Http(format!("unknown path {other}"))),
        };
        Ok(AbciResponse {
            value,
            ..AbciResponse::default()
        })
    }

    async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<BroadcastResult, TransportError> {
        self.broadcasts.lock().unwrap().push(tx_bytes.to_vec());
        Ok(BroadcastResult {
            txhash: terra_keyserver::tx::codec::txid(tx_bytes),
            code: 0,
            raw_log: "[]".to_string(),
        })
    }
}

/// Cheap Argon2 parameters so tests stay fast.
pub fn test_kdf() -> KdfConfig {
    KdfConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn test_state(key_dir: &Path, node: Arc<ScriptedNode>) -> AppState {
    let profile = Arc::new(ChainProfile::terra());
    let registry = KeyRegistry::new(key_dir, test_kdf(), profile.clone());
    AppState::new(registry, node, profile)
}

pub fn test_app(key_dir: &Path, node: Arc<ScriptedNode>) -> Router {
    build_router(test_state(key_dir, node), &LimitsConfig::default())
}

/// Send one request through the router and decode the JSON reply (Null when empty).
pub async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
