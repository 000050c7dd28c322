//! JSON <-> protobuf transaction codec and transaction id.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use prost::Message;
use sha2::{Digest, Sha256};

use crate::chain::SignMode;
use crate::coins::Coin;
use crate::tx::model::{self, Msg, MSG_SEND_TYPE_URL, SECP256K1_PUBKEY_TYPE_URL};
use crate::tx::proto;
use crate::tx::TxError;

fn coins_to_proto(coins: &[Coin]) -> Vec<proto::Coin> {
    coins
        .iter()
        .map(|c| proto::Coin {
            denom: c.denom.clone(),
            amount: c.amount.to_string(),
        })
        .collect()
}

fn coins_from_proto(coins: Vec<proto::Coin>) -> Result<Vec<Coin>, TxError> {
    coins
        .into_iter()
        .map(|c| -> Result<Coin, TxError> {
            Ok(Coin {
                amount: c.amount.parse()?,
                denom: c.denom,
            })
        })
        .collect()
}

fn decode_b64(field: &str, value: &str) -> Result<Vec<u8>, TxError> {
    B64.decode(value)
        .map_err(|e| TxError::Decode(format!("{field}: {e}")))
}

pub fn body_to_proto(body: &model::TxBody) -> proto::TxBody {
    let messages = body
        .messages
        .iter()
        .map(|msg| match msg {
            Msg::Send(send) => proto::Any {
                type_url: MSG_SEND_TYPE_URL.to_string(),
                value: proto::MsgSend {
                    from_address: send.from_address.clone(),
                    to_address: send.to_address.clone(),
                    amount: coins_to_proto(&send.amount),
                }
                .encode_to_vec(),
            },
        })
        .collect();

    proto::TxBody {
        messages,
        memo: body.memo.clone(),
        timeout_height: body.timeout_height,
    }
}

pub fn auth_info_to_proto(auth: &model::AuthInfo) -> Result<proto::AuthInfo, TxError> {
    let signer_infos = auth
        .signer_infos
        .iter()
        .map(|info| -> Result<proto::SignerInfo, TxError> {
            let public_key = match &info.public_key {
                Some(pk) => {
                    if pk.type_url != SECP256K1_PUBKEY_TYPE_URL {
                        return Err(TxError::UnsupportedType(pk.type_url.clone()));
                    }
                    Some(proto::Any {
                        type_url: pk.type_url.clone(),
                        value: proto::PubKey {
                            key: decode_b64("public_key.key", &pk.key)?,
                        }
                        .encode_to_vec(),
                    })
                }
                None => None,
            };
            Ok(proto::SignerInfo {
                public_key,
                mode_info: Some(proto::ModeInfo {
                    sum: Some(proto::mode_info::Sum::Single(proto::mode_info::Single {
                        mode: info.mode_info.single.mode.as_proto(),
                    })),
                }),
                sequence: info.sequence,
            })
        })
        .collect::<Result<Vec<_>, TxError>>()?;

    Ok(proto::AuthInfo {
        signer_infos,
        fee: Some(proto::Fee {
            amount: coins_to_proto(&auth.fee.amount),
            gas_limit: auth.fee.gas_limit,
            payer: auth.fee.payer.clone(),
            granter: auth.fee.granter.clone(),
        }),
    })
}

pub fn to_raw(tx: &model::Tx) -> Result<proto::TxRaw, TxError> {
    let signatures = tx
        .signatures
        .iter()
        .map(|s| decode_b64("signatures", s))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(proto::TxRaw {
        body_bytes: body_to_proto(&tx.body).encode_to_vec(),
        auth_info_bytes: auth_info_to_proto(&tx.auth_info)?.encode_to_vec(),
        signatures,
    })
}

fn body_from_proto(body: proto::TxBody) -> Result<model::TxBody, TxError> {
    let messages = body
        .messages
        .into_iter()
        .map(|any| -> Result<Msg, TxError> {
            if any.type_url != MSG_SEND_TYPE_URL {
                return Err(TxError::UnsupportedType(any.type_url));
            }
            let send = proto::MsgSend::decode(any.value.as_slice())
                .map_err(|e| TxError::Decode(format!("MsgSend: {e}")))?;
            Ok(Msg::Send(model::MsgSend {
                from_address: send.from_address,
                to_address: send.to_address,
                amount: coins_from_proto(send.amount)?,
            }))
        })
        .collect::<Result<Vec<_>, TxError>>()?;

    Ok(model::TxBody {
        messages,
        memo: body.memo,
        timeout_height: body.timeout_height,
    })
}

fn auth_info_from_proto(auth: proto::AuthInfo) -> Result<model::AuthInfo, TxError> {
    let signer_infos = auth
        .signer_infos
        .into_iter()
        .map(|info| -> Result<model::SignerInfo, TxError> {
            let public_key = match info.public_key {
                Some(any) => {
                    if any.type_url != SECP256K1_PUBKEY_TYPE_URL {
                        return Err(TxError::UnsupportedType(any.type_url));
                    }
                    let pk = proto::PubKey::decode(any.value.as_slice())
                        .map_err(|e| TxError::Decode(format!("PubKey: {e}")))?;
                    Some(model::PublicKey {
                        type_url: any.type_url,
                        key: B64.encode(pk.key),
                    })
                }
                None => None,
            };
            let mode = match info.mode_info.and_then(|m| m.sum) {
                Some(proto::mode_info::Sum::Single(single)) => SignMode::from_proto(single.mode)
                    .ok_or_else(|| TxError::Decode(format!("unsupported sign mode {}", single.mode)))?,
                None => return Err(TxError::Decode("signer info without mode".to_string())),
            };
            Ok(model::SignerInfo {
                public_key,
                mode_info: model::ModeInfo::single(mode),
                sequence: info.sequence,
            })
        })
        .collect::<Result<Vec<_>, TxError>>()?;

    let fee = auth.fee.unwrap_or_default();
    Ok(model::AuthInfo {
        signer_infos,
        fee: model::Fee {
            amount: coins_from_proto(fee.amount)?,
            gas_limit: fee.gas_limit,
            payer: fee.payer,
            granter: fee.granter,
        },
    })
}

/// JSON transaction to canonical protobuf `TxRaw` bytes.
pub fn encode(tx: &model::Tx) -> Result<Vec<u8>, TxError> {
    Ok(to_raw(tx)?.encode_to_vec())
}

/// Protobuf `TxRaw` bytes back to the JSON form.
pub fn decode(bytes: &[u8]) -> Result<model::Tx, TxError> {
    let raw = proto::TxRaw::decode(bytes).map_err(|e| TxError::Decode(format!("TxRaw: {e}")))?;
    let body = proto::TxBody::decode(raw.body_bytes.as_slice())
        .map_err(|e| TxError::Decode(format!("TxBody: {e}")))?;
    let auth = proto::AuthInfo::decode(raw.auth_info_bytes.as_slice())
        .map_err(|e| TxError::Decode(format!("AuthInfo: {e}")))?;

    Ok(model::Tx {
        body: body_from_proto(body)?,
        auth_info: auth_info_from_proto(auth)?,
        signatures: raw.signatures.iter().map(|s| B64.encode(s)).collect(),
    })
}

/// Upper-case hex SHA-256 of the encoded transaction.
pub fn txid(tx_bytes: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(tx_bytes))
}
