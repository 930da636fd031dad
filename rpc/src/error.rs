//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use eduverify_governance::{ErrorKind, GovernanceError};
use eduverify_ledger::LedgerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("server error: {0}")]
    Server(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl RpcError {
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            RpcError::Governance(e) => match e.kind() {
                ErrorKind::Unauthorized => (StatusCode::FORBIDDEN, "unauthorized"),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
                ErrorKind::Conflict => (StatusCode::CONFLICT, "conflict"),
                ErrorKind::PreconditionFailed => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "precondition_failed")
                }
                ErrorKind::ExecutionFailed => (StatusCode::UNPROCESSABLE_ENTITY, "execution_failed"),
                ErrorKind::InvalidArgument => (StatusCode::BAD_REQUEST, "invalid_argument"),
                ErrorKind::Storage => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
            },
            RpcError::Ledger(e) => match e {
                LedgerError::Unauthorized(_) => (StatusCode::FORBIDDEN, "unauthorized"),
                LedgerError::DuplicateCredential(_) | LedgerError::DuplicateContent(_) => {
                    (StatusCode::CONFLICT, "conflict")
                }
                LedgerError::NotFound(_) | LedgerError::DocumentNotFound(_) => {
                    (StatusCode::NOT_FOUND, "not_found")
                }
                LedgerError::InvalidArgument(_)
                | LedgerError::InvalidIdentifier(_)
                | LedgerError::EmptyDocument => {
                    (StatusCode::BAD_REQUEST, "invalid_argument")
                }
                LedgerError::DocumentTooLarge { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "invalid_argument")
                }
            },
            RpcError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
            RpcError::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server"),
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: kind.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
