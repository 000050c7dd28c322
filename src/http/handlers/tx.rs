//! `/tx` handlers.

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::http::extract::{string_lenient, JsonBody};
use crate::http::handlers::blocking;
use crate::http::server::AppState;
use crate::http::ApiError;
use crate::node::BroadcastResult;
use crate::tx::{broadcast, codec, SendRequest, SignRequest, Tx, TxError};

#[derive(Debug, Deserialize)]
pub struct SignBody {
    pub tx: serde_json::Value,
    #[serde(default)]
    pub name: String,
    pub passphrase: SecretString,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub account_number: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub sequence: String,
}

#[derive(Debug, Deserialize)]
pub struct SendBody {
    #[serde(default)]
    pub sender: String,
    #[serde(default, alias = "reciever")]
    pub receiver: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub fees: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub gas: String,
    #[serde(default)]
    pub gas_prices: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub gas_adjustment: String,
}

#[derive(Debug, Deserialize)]
pub struct TxBody {
    pub tx: Tx,
}

#[derive(Debug, Serialize)]
pub struct EncodedTx {
    pub tx: String,
}

#[derive(Debug, Serialize)]
pub struct TxHash {
    pub txbytes: String,
    pub txid: String,
}

#[derive(Debug, Deserialize)]
pub struct DecodeBody {
    pub tx: String,
}

#[derive(Debug, Serialize)]
pub struct DecodedTx {
    pub tx: Tx,
}

pub async fn sign(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SignBody>,
) -> Result<Json<Tx>, ApiError> {
    let signer = state.signer.clone();
    let request = SignRequest {
        tx: body.tx,
        name: body.name,
        passphrase: body.passphrase,
        chain_id: body.chain_id,
        account_number: body.account_number,
        sequence: body.sequence,
    };
    let signed = blocking(move || signer.sign(request)).await?;
    Ok(Json(signed))
}

pub async fn bank_send(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SendBody>,
) -> Result<Json<Tx>, ApiError> {
    tracing::debug!(chain_id = %body.chain_id, sender = %body.sender, "Building send transaction");
    let request = SendRequest {
        sender: body.sender,
        receiver: body.receiver,
        amount: body.amount,
        memo: body.memo,
        fees: body.fees,
        gas: body.gas,
        gas_prices: body.gas_prices,
        gas_adjustment: body.gas_adjustment,
    };
    let tx = state.assembler.build_send(&request).await?;
    Ok(Json(tx))
}

pub async fn encode(JsonBody(body): JsonBody<TxBody>) -> Result<Json<EncodedTx>, ApiError> {
    let bytes = codec::encode(&body.tx)?;
    Ok(Json(EncodedTx {
        tx: B64.encode(bytes),
    }))
}

pub async fn hash(JsonBody(body): JsonBody<TxBody>) -> Result<Json<TxHash>, ApiError> {
    let bytes = codec::encode(&body.tx)?;
    Ok(Json(TxHash {
        txid: codec::txid(&bytes),
        txbytes: hex::encode(bytes),
    }))
}

pub async fn decode(JsonBody(body): JsonBody<DecodeBody>) -> Result<Json<DecodedTx>, ApiError> {
    let bytes = B64
        .decode(body.tx.trim())
        .map_err(|e| TxError::Decode(e.to_string()))?;
    Ok(Json(DecodedTx {
        tx: codec::decode(&bytes)?,
    }))
}

pub async fn broadcast_tx(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<TxBody>,
) -> Result<Json<BroadcastResult>, ApiError> {
    let result = broadcast::broadcast(state.node.as_ref(), &body.tx).await?;
    Ok(Json(result))
}
