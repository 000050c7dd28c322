//! Fee oracle: tax rate, tax cap and gas simulation queries.

use std::sync::Arc;

use prost::Message;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::coins::{Dec, Int};
use crate::node::query::NodeQuery;
use crate::node::OracleError;
use crate::observability::metrics;
use crate::tx::proto;

pub const CURRENT_EPOCH_PATH: &str = "custom/treasury/currentEpoch";
pub const TAX_RATE_PATH: &str = "custom/treasury/taxRate";
pub const TAX_CAP_PATH: &str = "custom/treasury/taxCap";
pub const SIMULATE_PATH: &str = "/cosmos.tx.v1beta1.Service/Simulate";

/// Pure queries of the node. Nothing is cached; every call goes to the node.
#[derive(Clone)]
pub struct FeeOracle {
    node: Arc<dyn NodeQuery>,
}

impl FeeOracle {
    pub fn new(node: Arc<dyn NodeQuery>) -> Self {
        Self { node }
    }

    async fn query(&self, path: &'static str, data: &[u8]) -> Result<Vec<u8>, OracleError> {
        let response = match self.node.abci_query(path, data).await {
            Ok(r) => r,
            Err(source) => {
                metrics::record_node_query(path, "transport_error");
                return Err(OracleError::Transport { path, source });
            }
        };
        if !response.is_ok() {
            metrics::record_node_query(path, "rejected");
            tracing::warn!(path, code = response.code, log = %response.log, "Node rejected query");
            return Err(OracleError::Rejected {
                path,
                log: response.log,
            });
        }
        metrics::record_node_query(path, "ok");
        Ok(response.value)
    }

    fn decode_json<T: DeserializeOwned>(path: &'static str, value: &[u8]) -> Result<T, OracleError> {
        serde_json::from_slice(value).map_err(|e| OracleError::Decode {
            path,
            reason: e.to_string(),
        })
    }

    pub async fn current_epoch(&self) -> Result<u64, OracleError> {
        let value = self.query(CURRENT_EPOCH_PATH, &[]).await?;
        let epoch: Int = Self::decode_json(CURRENT_EPOCH_PATH, &value)?;
        epoch.to_string().parse().map_err(|_| OracleError::Decode {
            path: CURRENT_EPOCH_PATH,
            reason: format!("epoch {epoch} does not fit in 64 bits"),
        })
    }

    pub async fn tax_rate(&self, epoch: u64) -> Result<Dec, OracleError> {
        let payload = json!({ "epoch": epoch.to_string() }).to_string();
        let value = self.query(TAX_RATE_PATH, payload.as_bytes()).await?;
        Self::decode_json(TAX_RATE_PATH, &value)
    }

    /// Rate for the node's current epoch.
    pub async fn current_tax_rate(&self) -> Result<Dec, OracleError> {
        let epoch = self.current_epoch().await?;
        self.tax_rate(epoch).await
    }

    pub async fn tax_cap(&self, denom: &str) -> Result<Int, OracleError> {
        let payload = json!({ "denom": denom }).to_string();
        let value = self.query(TAX_CAP_PATH, payload.as_bytes()).await?;
        Self::decode_json(TAX_CAP_PATH, &value)
    }

    /// Gas used by `tx_bytes` according to the node's simulation.
    pub async fn simulate_gas(&self, tx_bytes: Vec<u8>) -> Result<u64, OracleError> {
        let request = proto::SimulateRequest { tx_bytes };
        let value = self.query(SIMULATE_PATH, &request.encode_to_vec()).await?;
        let response =
            proto::SimulateResponse::decode(value.as_slice()).map_err(|e| OracleError::Decode {
                path: SIMULATE_PATH,
                reason: e.to_string(),
            })?;
        response
            .gas_info
            .map(|info| info.gas_used)
            .ok_or(OracleError::Decode {
                path: SIMULATE_PATH,
                reason: "response has no gas info".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::query::{AbciResponse, BroadcastResult};
    use crate::node::TransportError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedNode {
        replies: HashMap<String, AbciResponse>,
        seen: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl ScriptedNode {
        fn reply(mut self, path: &str, value: &[u8]) -> Self {
            self.replies.insert(
                path.to_string(),
                AbciResponse {
                    value: value.to_vec(),
                    ..AbciResponse::default()
                },
            );
            self
        }

        fn reject(mut self, path: &str, log: &str) -> Self {
            self.replies.insert(
                path.to_string(),
                AbciResponse {
                    code: 6,
                    log: log.to_string(),
                    value: Vec::new(),
                },
            );
            self
        }
    }

    #[async_trait]
    impl NodeQuery for ScriptedNode {
        async fn abci_query(&self, path: &str, data: &[u8]) -> Result<AbciResponse, TransportError> {
            self.seen.lock().unwrap().push((path.to_string(), data.to_vec()));
            self.replies
                .get(path)
                .cloned()
                .ok_or(TransportError::Http("connection refused".to_string()))
        }

        async fn broadcast_tx_sync(&self, _tx: &[u8]) -> Result<BroadcastResult, TransportError> {
            Err(TransportError::Timeout)
        }
    }

    #[tokio::test]
    async fn test_tax_rate_resolves_epoch_first() {
        let node = Arc::new(
            ScriptedNode::default()
                .reply(CURRENT_EPOCH_PATH, b"\"12\"")
                .reply(TAX_RATE_PATH, b"\"0.007000000000000000\""),
        );
        let oracle = FeeOracle::new(node.clone());

        let rate = oracle.current_tax_rate().await.unwrap();
        assert_eq!(rate, "0.007".parse::<Dec>().unwrap());

        let seen = node.seen.lock().unwrap();
        assert_eq!(seen[0].0, CURRENT_EPOCH_PATH);
        assert!(seen[0].1.is_empty());
        assert_eq!(seen[1].0, TAX_RATE_PATH);
        assert_eq!(seen[1].1, br#"{"epoch":"12"}"#);
    }

    #[tokio::test]
    async fn test_numeric_epoch_and_cap() {
        let node = Arc::new(
            ScriptedNode::default()
                .reply(CURRENT_EPOCH_PATH, b"3")
                .reply(TAX_CAP_PATH, b"\"1000000\""),
        );
        let oracle = FeeOracle::new(node.clone());
        assert_eq!(oracle.current_epoch().await.unwrap(), 3);
        assert_eq!(oracle.tax_cap("uusd").await.unwrap(), Int::from_u64(1_000_000));
        assert_eq!(node.seen.lock().unwrap()[1].1, br#"{"denom":"uusd"}"#);
    }

    #[tokio::test]
    async fn test_rejection_keeps_log_verbatim() {
        let node = Arc::new(ScriptedNode::default().reject(TAX_CAP_PATH, "unknown denom: ufoo"));
        let err = FeeOracle::new(node).tax_cap("ufoo").await.unwrap_err();
        assert_eq!(err.to_string(), "unknown denom: ufoo");
        assert!(matches!(err, OracleError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_transport_and_decode_are_distinct() {
        let oracle = FeeOracle::new(Arc::new(ScriptedNode::default()));
        assert!(matches!(
            oracle.current_epoch().await,
            Err(OracleError::Transport { .. })
        ));

        let oracle = FeeOracle::new(Arc::new(
            ScriptedNode::default().reply(CURRENT_EPOCH_PATH, b"not json"),
        ));
        assert!(matches!(
            oracle.current_epoch().await,
            Err(OracleError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_simulate_gas() {
        let response = proto::SimulateResponse {
            gas_info: Some(proto::GasInfo {
                gas_wanted: 200_000,
                gas_used: 73_421,
            }),
        };
        let node = Arc::new(ScriptedNode::default().reply(SIMULATE_PATH, &response.encode_to_vec()));
        let oracle = FeeOracle::new(node.clone());

        assert_eq!(oracle.simulate_gas(vec![1, 2, 3]).await.unwrap(), 73_421);

        let sent = node.seen.lock().unwrap()[0].1.clone();
        let request = proto::SimulateRequest::decode(sent.as_slice()).unwrap();
        assert_eq!(request.tx_bytes, vec![1, 2, 3]);
    }
}
