//! Legacy amino JSON sign bytes (`StdSignDoc`).

use serde_json::{json, Value};

use crate::coins::Coin;
use crate::tx::model::{Msg, Tx};

fn coins_json(coins: &[Coin]) -> Value {
    Value::Array(
        coins
            .iter()
            .map(|c| json!({ "amount": c.amount.to_string(), "denom": c.denom }))
            .collect(),
    )
}

fn msg_json(msg: &Msg) -> Value {
    match msg {
        Msg::Send(send) => json!({
            "type": "bank/MsgSend",
            "value": {
                "amount": coins_json(&send.amount),
                "from_address": send.from_address,
                "to_address": send.to_address,
            }
        }),
    }
}

/// Compact JSON with object keys in byte order, independent of how the
/// `serde_json` map type is configured.
fn write_sorted(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_sorted(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_sorted(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Escape `<`, `>`, `&`, U+2028 and U+2029 the way Go's JSON encoder does.
/// These can only appear inside string literals, so a plain replace is exact.
fn escape_html(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Canonical sign bytes: keys sorted, no whitespace, HTML characters escaped.
pub fn sign_bytes(tx: &Tx, chain_id: &str, account_number: u64, sequence: u64) -> Vec<u8> {
    let mut doc = json!({
        "account_number": account_number.to_string(),
        "chain_id": chain_id,
        "fee": {
            "amount": coins_json(&tx.auth_info.fee.amount),
            "gas": tx.auth_info.fee.gas_limit.to_string(),
        },
        "memo": tx.body.memo,
        "msgs": tx.body.messages.iter().map(msg_json).collect::<Vec<_>>(),
        "sequence": sequence.to_string(),
    });
    if tx.body.timeout_height != 0 {
        doc["timeout_height"] = Value::String(tx.body.timeout_height.to_string());
    }
    let mut out = String::new();
    write_sorted(&doc, &mut out);
    escape_html(&out).into_bytes()
}
