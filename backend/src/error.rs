//! HTTP mapping for request-level failures.
//!
//! Row-level problems never reach this module: they are folded into the import
//! outcome. Everything here rejects a whole request with `{"error": "..."}`.

use crate::auth::AuthError;
use crate::spreadsheet::SpreadsheetError;
use crate::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use certs_common::responses::ErrorResponse;
use thiserror::Error;

/// A batch-level import failure. No row outcome is produced.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Missing file")]
    MissingFile,

    #[error("File exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },

    #[error("Invalid multipart payload: {0}")]
    Multipart(String),

    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),

    #[error("Import timed out; rows written before the timeout remain committed")]
    TimedOut,

    #[error("Import worker failed: {0}")]
    Worker(String),
}

/// Failures of the public lookup and download endpoints.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Certificate not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to render PDF: {0}")]
    Render(String),

    #[error("Lookup worker failed: {0}")]
    Worker(String),
}

fn json_error(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse::new(message))
}

impl ResponseError for ImportError {
    fn status_code(&self) -> StatusCode {
        match self {
            ImportError::MissingFile
            | ImportError::Multipart(_)
            | ImportError::Spreadsheet(_) => StatusCode::BAD_REQUEST,
            ImportError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ImportError::TimedOut => StatusCode::GATEWAY_TIMEOUT,
            ImportError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), self.to_string())
    }
}

impl ResponseError for LookupError {
    fn status_code(&self) -> StatusCode {
        match self {
            LookupError::NotFound => StatusCode::NOT_FOUND,
            LookupError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            LookupError::Render(_) | LookupError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), self.to_string())
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            AuthError::NotAdmin => StatusCode::FORBIDDEN,
            AuthError::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), self.to_string())
    }
}
