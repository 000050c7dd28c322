//! Error responses.
//!
//! Every failure leaves the server as `{"error": "<message>"}` with a status
//! derived from the error's [`ErrorClass`].

use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{Classify, ErrorClass};
use crate::keys::KeyError;
use crate::tx::TxError;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::Validation => StatusCode::BAD_REQUEST,
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::Auth => StatusCode::UNAUTHORIZED,
        ErrorClass::Upstream => StatusCode::BAD_REQUEST,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn classified<E: Classify + Display>(err: E) -> Self {
        let class = err.class();
        match class {
            ErrorClass::Internal => tracing::error!(error = %err, "Request failed"),
            ErrorClass::Upstream => tracing::warn!(error = %err, "Node call failed"),
            _ => tracing::debug!(error = %err, ?class, "Request rejected"),
        }
        Self::new(status_for(class), err.to_string())
    }
}

impl From<KeyError> for ApiError {
    fn from(err: KeyError) -> Self {
        Self::classified(err)
    }
}

impl From<TxError> for ApiError {
    fn from(err: TxError) -> Self {
        Self::classified(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!(error = %err, "Blocking task failed");
        Self::internal(format!("keyring task failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
