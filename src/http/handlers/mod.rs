//! Request handlers.
//!
//! Keyring work (KDF plus file I/O) never runs on the async workers; it goes
//! through [`blocking`].

pub mod keys;
pub mod tx;

use axum::Json;
use serde::Serialize;

use crate::http::ApiError;

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
}

pub async fn version() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run `work` on the blocking pool and flatten both failure layers.
pub(crate) async fn blocking<T, E, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    ApiError: From<E>,
{
    Ok(tokio::task::spawn_blocking(work).await??)
}
