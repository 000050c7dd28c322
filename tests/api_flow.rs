//! End-to-end API scenarios against the router with a scripted node.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{call, test_app, ScriptedNode, ADDRESS, MNEMONIC, PASSWORD, PUBKEY};

mod common;

async fn create_jack(app: &axum::Router) -> Value {
    let (status, body) = call(
        app,
        Method::POST,
        "/keys",
        Some(json!({ "name": "jack", "password": PASSWORD, "mnemonic": MNEMONIC })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn test_version() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), Arc::new(ScriptedNode::default()));
    let (status, body) = call(&app, Method::GET, "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_key_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), Arc::new(ScriptedNode::default()));

    let (status, body) = call(&app, Method::GET, "/keys", Some(json!({ "password": PASSWORD }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let created = create_jack(&app).await;
    assert_eq!(created["name"], "jack");
    assert_eq!(created["type"], "local");
    assert_eq!(created["address"], ADDRESS);
    assert_eq!(created["pubkey"], PUBKEY);
    assert_eq!(created["mnemonic"], MNEMONIC);

    let (status, body) = call(&app, Method::GET, "/keys", Some(json!({ "password": PASSWORD }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert!(body[0].get("mnemonic").is_none());

    let (status, body) = call(
        &app,
        Method::GET,
        "/keys/jack?bech=val",
        Some(json!({ "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], "terravaloper1c76v9qw4x3h48pxchve2krxmydwrkyxz3ev5zy");

    let (status, body) = call(
        &app,
        Method::GET,
        "/keys/jack?bech=cons",
        Some(json!({ "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["pubkey"],
        "terravalconspub1addwnpepqtextz2p2tm3uqqj7jy56md3az6qmj6pmcn6s57z6eh6hrhrdpnhq6va0s9"
    );

    let (status, _) = call(&app, Method::GET, "/keys/jill", Some(json!({ "password": PASSWORD }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(
        &app,
        Method::GET,
        "/keys/jack?bech=bogus",
        Some(json!({ "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("bogus"));

    let (status, _) = call(&app, Method::DELETE, "/keys/jack", Some(json!({ "password": "foobarbaz" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app, Method::DELETE, "/keys/jack", Some(json!({ "password": PASSWORD }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, _) = call(&app, Method::GET, "/keys/jack", Some(json!({ "password": PASSWORD }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_out_of_range_account_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), Arc::new(ScriptedNode::default()));

    let (status, body) = call(
        &app,
        Method::POST,
        "/keys",
        Some(json!({ "name": "jack", "password": PASSWORD, "account": "-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = call(
        &app,
        Method::POST,
        "/keys",
        Some(json!({ "name": "jack", "password": PASSWORD, "index": 2147483648i64 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::GET, "/keys", Some(json!({ "password": PASSWORD }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_password_rotation() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), Arc::new(ScriptedNode::default()));
    create_jack(&app).await;

    let (status, _) = call(
        &app,
        Method::PUT,
        "/keys/jack",
        Some(json!({ "old_password": "wrongpass", "new_password": "foobarbaz" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        Method::PUT,
        "/keys/jack",
        Some(json!({ "old_password": PASSWORD, "new_password": "foobarbaz" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, "/keys", Some(json!({ "password": "foobarbaz" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["address"], ADDRESS);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), Arc::new(ScriptedNode::default()));
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/keys")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_send_rejects_fees_with_gas_prices() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), Arc::new(ScriptedNode::default()));
    let (status, body) = call(
        &app,
        Method::POST,
        "/tx/bank/send",
        Some(json!({
            "sender": ADDRESS,
            "receiver": ADDRESS,
            "amount": "1000uusd",
            "chain_id": "columbus-5",
            "fees": "10uluna",
            "gas_prices": "0.015uluna"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "GasPrices and Fees cannot be used at the same time");
}

#[tokio::test]
async fn test_send_computes_gas_and_tax() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), Arc::new(ScriptedNode::default()));
    let (status, tx) = call(
        &app,
        Method::POST,
        "/tx/bank/send",
        Some(json!({
            "sender": ADDRESS,
            "reciever": ADDRESS,
            "amount": "1000000uusd,500000ukrw,7uluna",
            "chain_id": "columbus-5",
            "memo": "hello",
            "gas_adjustment": 1.5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{tx}");
    assert_eq!(tx["auth_info"]["fee"]["gas_limit"], "112500");
    assert_eq!(
        tx["auth_info"]["fee"]["amount"],
        json!([
            {"denom": "ukrw", "amount": "1000"},
            {"denom": "uusd", "amount": "7000"}
        ])
    );
    assert_eq!(tx["body"]["memo"], "hello");
    assert_eq!(tx["signatures"], json!([""]));
}

#[tokio::test]
async fn test_send_surfaces_node_rejection() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), Arc::new(ScriptedNode::default()));
    let (status, body) = call(
        &app,
        Method::POST,
        "/tx/bank/send",
        Some(json!({ "sender": ADDRESS, "receiver": ADDRESS, "amount": "5ufoo", "gas": "1000" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid denom ufoo");
}

#[tokio::test]
async fn test_sign_encode_hash_decode_broadcast() {
    let dir = tempfile::tempdir().unwrap();
    let node = Arc::new(ScriptedNode::default());
    let app = test_app(dir.path(), node.clone());
    create_jack(&app).await;

    let (status, unsigned) = call(
        &app,
        Method::POST,
        "/tx/bank/send",
        Some(json!({ "sender": ADDRESS, "receiver": ADDRESS, "amount": "1000uluna", "gas": "100000" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{unsigned}");

    let (status, signed) = call(
        &app,
        Method::POST,
        "/tx/sign",
        Some(json!({
            "tx": unsigned,
            "name": "jack",
            "passphrase": PASSWORD,
            "chain_id": "columbus-5",
            "account_number": "12",
            "sequence": "0"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{signed}");
    assert_ne!(signed["signatures"][0], "");
    assert_eq!(
        signed["auth_info"]["signer_infos"][0]["public_key"]["@type"],
        "/cosmos.crypto.secp256k1.PubKey"
    );

    let (status, encoded) = call(&app, Method::POST, "/tx/encode", Some(json!({ "tx": signed }))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, hashed) = call(&app, Method::POST, "/tx/hash", Some(json!({ "tx": signed }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hashed["txid"].as_str().unwrap().len(), 64);

    let (status, decoded) = call(&app, Method::POST, "/tx/decode", Some(json!({ "tx": encoded["tx"] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decoded["tx"], signed);

    let (status, result) = call(&app, Method::POST, "/tx/broadcast", Some(json!({ "tx": signed }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["txhash"], hashed["txid"]);
    assert_eq!(result["code"], 0);
    assert_eq!(
        hex::encode(&node.broadcasts.lock().unwrap()[0]),
        hashed["txbytes"].as_str().unwrap()
    );
}

#[tokio::test]
async fn test_sign_with_wrong_passphrase_fails() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), Arc::new(ScriptedNode::default()));
    create_jack(&app).await;
    let (_, unsigned) = call(
        &app,
        Method::POST,
        "/tx/bank/send",
        Some(json!({ "sender": ADDRESS, "receiver": ADDRESS, "amount": "1uluna", "gas": "1" })),
    )
    .await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/tx/sign",
        Some(json!({
            "tx": unsigned,
            "name": "jack",
            "passphrase": "foobarbaz",
            "chain_id": "columbus-5",
            "account_number": "0",
            "sequence": "0"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_decode_rejects_bad_base64() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), Arc::new(ScriptedNode::default()));
    let (status, body) = call(&app, Method::POST, "/tx/decode", Some(json!({ "tx": "***" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("failed to decode transaction"));
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    use terra_keyserver::config::{LimitsConfig, ListenerConfig};
    use terra_keyserver::{HttpServer, Shutdown};

    let dir = tempfile::tempdir().unwrap();
    let state = common::test_state(dir.path(), Arc::new(ScriptedNode::default()));
    let listener = ListenerConfig {
        bind_address: "127.0.0.1:28391".to_string(),
        tls: None,
    };
    let shutdown = Shutdown::new();
    let server = tokio::spawn(HttpServer::new(state, listener, &LimitsConfig::default()).run(shutdown.clone()));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = reqwest::get("http://127.0.0.1:28391/version").await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
