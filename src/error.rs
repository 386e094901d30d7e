use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug)]
pub enum ServiceError {
    Validation(BTreeMap<String, String>),
    Transport(String),
    Gateway(String),
    Reconciliation(String),
    NotFound(String),
    Storage(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Transport(_) => "TRANSPORT_ERROR",
            ServiceError::Gateway(_) => "GATEWAY_ERROR",
            ServiceError::Reconciliation(_) => "RECONCILIATION_ERROR",
            ServiceError::NotFound(_) => "TRANSACTION_NOT_FOUND",
            ServiceError::Storage(_) => "STATUS_FETCH_FAILED",
        }
    }

    pub fn status(&self) -> axum::http::StatusCode {
        match self {
            ServiceError::Validation(_) => axum::http::StatusCode::BAD_REQUEST,
            ServiceError::Transport(_) => axum::http::StatusCode::BAD_GATEWAY,
            ServiceError::Gateway(_) => axum::http::StatusCode::BAD_GATEWAY,
            ServiceError::Reconciliation(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::NotFound(_) => axum::http::StatusCode::NOT_FOUND,
            ServiceError::Storage(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ServiceError::Validation(_) => "request validation failed".to_string(),
            ServiceError::Transport(m)
            | ServiceError::Gateway(m)
            | ServiceError::Reconciliation(m)
            | ServiceError::NotFound(m)
            | ServiceError::Storage(m) => m.clone(),
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let details = match self {
            ServiceError::Validation(fields) => serde_json::to_value(fields).ok(),
            _ => None,
        };
        ErrorEnvelope {
            error: ErrorPayload {
                code: self.code().to_string(),
                message: self.message(),
                details,
            },
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Validation(fields) => write!(f, "validation failed: {:?}", fields),
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}

impl std::error::Error for ServiceError {}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}
