use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// HTTP-facing error type. Each domain failure kind keeps its own variant so
/// responses carry a distinct machine-readable `code` alongside the message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    EmptyCart(String),

    #[error("{0}")]
    InsufficientStock(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::EmptyCart(_) => "EMPTY_CART",
            AppError::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Validation(_) => "VALIDATION",
            AppError::NotFound => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::EmptyCart => AppError::EmptyCart(e.to_string()),
            DomainError::InsufficientStock(_) => AppError::InsufficientStock(e.to_string()),
            DomainError::BadRequest(msg) => AppError::BadRequest(msg),
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::NotFound => AppError::NotFound,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            AppError::EmptyCart(_)
            | AppError::InsufficientStock(_)
            | AppError::BadRequest(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // Internal details stay in the logs, not on the wire.
            AppError::Internal(_) => HttpResponse::InternalServerError().json(json!({
                "code": self.code(),
                "error": "Internal server error"
            })),
            other => HttpResponse::build(self.status_code()).json(json!({
                "code": other.code(),
                "error": other.to_string()
            })),
        }
    }
}
