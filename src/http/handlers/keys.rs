//! `/keys` handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use secrecy::SecretString;
use serde::Deserialize;

use crate::http::extract::{i64_lenient, JsonBody};
use crate::http::handlers::blocking;
use crate::http::server::AppState;
use crate::http::ApiError;
use crate::keys::{KeyOutput, NewKey};

fn empty_secret() -> SecretString {
    SecretString::from("")
}

#[derive(Debug, Deserialize)]
pub struct PasswordBody {
    #[serde(default = "empty_secret")]
    pub password: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct CreateKeyBody {
    #[serde(default)]
    pub name: String,
    #[serde(default = "empty_secret")]
    pub password: SecretString,
    #[serde(default)]
    pub mnemonic: Option<String>,
    #[serde(default, deserialize_with = "i64_lenient")]
    pub account: i64,
    #[serde(default, deserialize_with = "i64_lenient")]
    pub index: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateKeyBody {
    #[serde(default = "empty_secret")]
    pub old_password: SecretString,
    #[serde(default = "empty_secret")]
    pub new_password: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct BechQuery {
    #[serde(default)]
    pub bech: Option<String>,
}

pub async fn list_keys(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PasswordBody>,
) -> Result<Json<Vec<KeyOutput>>, ApiError> {
    let registry = state.registry.clone();
    let keys = blocking(move || registry.list(&body.password)).await?;
    Ok(Json(keys))
}

pub async fn create_key(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateKeyBody>,
) -> Result<Json<KeyOutput>, ApiError> {
    let registry = state.registry.clone();
    let request = NewKey {
        name: body.name,
        mnemonic: body.mnemonic.filter(|m| !m.trim().is_empty()),
        account: body.account,
        index: body.index,
    };
    let output = blocking(move || registry.create(&body.password, request)).await?;
    Ok(Json(output))
}

pub async fn get_key(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<BechQuery>,
    JsonBody(body): JsonBody<PasswordBody>,
) -> Result<Json<KeyOutput>, ApiError> {
    let registry = state.registry.clone();
    let kind = query
        .bech
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| "acc".to_string());
    let output = blocking(move || registry.get(&body.password, &name, &kind)).await?;
    Ok(Json(output))
}

pub async fn update_key(
    State(state): State<AppState>,
    Path(name): Path<String>,
    JsonBody(body): JsonBody<UpdateKeyBody>,
) -> Result<StatusCode, ApiError> {
    let registry = state.registry.clone();
    blocking(move || registry.update_password(&name, &body.old_password, &body.new_password))
        .await?;
    Ok(StatusCode::OK)
}

pub async fn delete_key(
    State(state): State<AppState>,
    Path(name): Path<String>,
    JsonBody(body): JsonBody<PasswordBody>,
) -> Result<StatusCode, ApiError> {
    let registry = state.registry.clone();
    blocking(move || registry.delete(&body.password, &name)).await?;
    Ok(StatusCode::OK)
}
