//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to appropriate HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use procurement_shared::types::{ErrorDetail, ErrorResponse};
use procurement_shared::FieldError;
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Validation failure carrying per-field details
    pub fn invalid_fields(message: impl Into<String>, fields: Vec<FieldError>) -> Self {
        ApiError::Validation {
            message: message.into(),
            fields,
        }
    }

    /// Generic "not authenticated" rejection
    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized("Authentication required".to_string())
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, field, details) = match self {
            ApiError::Validation { message, fields } => {
                let field = match fields.as_slice() {
                    [only] => Some(only.field.clone()),
                    _ => None,
                };
                let details = serde_json::to_value(&fields).ok();
                ("VALIDATION_ERROR", message, field, details)
            }
            ApiError::NotFound(msg) => ("NOT_FOUND", msg, None, None),
            ApiError::Unauthorized(msg) => ("UNAUTHORIZED", msg, None, None),
            ApiError::Forbidden(msg) => ("FORBIDDEN", msg, None, None),
            ApiError::Conflict(msg) => ("CONFLICT", msg, None, None),
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg, None, None),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
                details,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
