//! Synchronous broadcast of a signed transaction.

use crate::node::{BroadcastResult, NodeQuery};
use crate::tx::model::Tx;
use crate::tx::{codec, TxError};

/// Encode `tx` and hand it to the node. A non-zero `code` in the result is the
/// node's verdict, not an error of this call.
pub async fn broadcast(node: &dyn NodeQuery, tx: &Tx) -> Result<BroadcastResult, TxError> {
    let bytes = codec::encode(tx)?;
    let txid = codec::txid(&bytes);
    let result = node.broadcast_tx_sync(&bytes).await?;

    if result.code == 0 {
        tracing::info!(txhash = %result.txhash, "Transaction accepted by node");
    } else {
        tracing::warn!(
            txhash = %result.txhash,
            local_txid = %txid,
            code = result.code,
            raw_log = %result.raw_log,
            "Transaction rejected by node"
        );
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::SignMode;
    use crate::coins::Coins;
    use crate::node::{AbciResponse, TransportError};
    use crate::tx::model::{AuthInfo, Fee, ModeInfo, Msg, MsgSend, SignerInfo, TxBody};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingNode {
        reply: Result<BroadcastResult, TransportError>,
        sent: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait]
    impl NodeQuery for RecordingNode {
        async fn abci_query(&self, _path: &str, _data: &[u8]) -> Result<AbciResponse, TransportError> {
            Err(TransportError::Timeout)
        }

        async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<BroadcastResult, TransportError> {
            self.sent.lock().unwrap().push(tx_bytes.to_vec());
            self.reply.clone()
        }
    }

    fn tx() -> Tx {
        Tx {
            body: TxBody {
                messages: vec![Msg::Send(MsgSend {
                    from_address: "terra1from".to_string(),
                    to_address: "terra1to".to_string(),
                    amount: Coins::parse("1uluna").unwrap().into_vec(),
                })],
                memo: String::new(),
                timeout_height: 0,
            },
            auth_info: AuthInfo {
                signer_infos: vec![SignerInfo {
                    public_key: None,
                    mode_info: ModeInfo::single(SignMode::Direct),
                    sequence: 0,
                }],
                fee: Fee {
                    amount: Vec::new(),
                    gas_limit: 1,
                    payer: String::new(),
                    granter: String::new(),
                },
            },
            signatures: vec![String::new()],
        }
    }

    #[tokio::test]
    async fn test_sends_encoded_bytes_and_returns_verdict() {
        let node = RecordingNode {
            reply: Ok(BroadcastResult {
                txhash: "ABCD".to_string(),
                code: 5,
                raw_log: "insufficient funds".to_string(),
            }),
            sent: Mutex::new(Vec::new()),
        };
        let result = broadcast(&node, &tx()).await.unwrap();
        assert_eq!(result.code, 5);
        assert_eq!(result.raw_log, "insufficient funds");
        assert_eq!(node.sent.lock().unwrap()[0], codec::encode(&tx()).unwrap());
    }

    #[tokio::test]
    async fn test_transport_failure_is_error() {
        let node = RecordingNode {
            reply: Err(TransportError::Rpc {
                code: -32603,
                message: "tx already exists in cache".to_string(),
            }),
            sent: Mutex::new(Vec::new()),
        };
        assert!(matches!(
            broadcast(&node, &tx()).await,
            Err(TxError::Broadcast(TransportError::Rpc { .. }))
        ));
    }
}
