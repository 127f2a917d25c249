//! API Error Types
//!
//! Maps application errors to JSON-RPC error codes and REST status codes.

use crate::types::ErrorBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ghprofile_core::error::AppError;
use jsonrpsee::types::ErrorObjectOwned;
use thiserror::Error;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const THROTTLED: i32 = 4003;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const UPSTREAM_FETCH_ERROR: i32 = 5003;
    pub const UPSTREAM_GENERATION_ERROR: i32 = 5004;
}

/// Errors produced by the API handler
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Rate limit exceeded. Please slow down.")]
    Throttled,

    #[error(transparent)]
    App(#[from] AppError),
}

impl ApiError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Throttled => "throttled",
            ApiError::App(err) => match err {
                AppError::MalformedInput(_) => "malformed_input",
                AppError::NotFound(_) => "not_found",
                AppError::InvalidState(_) | AppError::Domain(_) => "invalid_state",
                AppError::UpstreamFetch(_) => "upstream_fetch",
                AppError::UpstreamGeneration(_) => "upstream_generation",
                AppError::Configuration(_) => "configuration",
                AppError::Serialization(_) | AppError::Internal(_) => "internal",
            },
        }
    }

    pub fn rpc_code(&self) -> i32 {
        match self {
            ApiError::Throttled => code::THROTTLED,
            ApiError::App(err) => match err {
                AppError::MalformedInput(_) | AppError::Serialization(_) => code::VALIDATION_ERROR,
                AppError::NotFound(_) => code::NOT_FOUND,
                AppError::InvalidState(_) | AppError::Domain(_) => code::CONFLICT,
                AppError::UpstreamFetch(_) => code::UPSTREAM_FETCH_ERROR,
                AppError::UpstreamGeneration(_) => code::UPSTREAM_GENERATION_ERROR,
                AppError::Configuration(_) | AppError::Internal(_) => code::INTERNAL_ERROR,
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Throttled => StatusCode::TOO_MANY_REQUESTS,
            ApiError::App(err) => match err {
                AppError::MalformedInput(_) => StatusCode::BAD_REQUEST,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::InvalidState(_) | AppError::Domain(_) => StatusCode::CONFLICT,
                AppError::UpstreamFetch(_) | AppError::UpstreamGeneration(_) => {
                    StatusCode::BAD_GATEWAY
                }
                AppError::Configuration(_)
                | AppError::Serialization(_)
                | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Throttled => self.to_string(),
            // Strip the "Kind error:" prefix, the kind travels separately
            ApiError::App(err) => match err {
                AppError::MalformedInput(m)
                | AppError::NotFound(m)
                | AppError::InvalidState(m)
                | AppError::UpstreamFetch(m)
                | AppError::UpstreamGeneration(m)
                | AppError::Configuration(m)
                | AppError::Internal(m) => m.clone(),
                other => other.to_string(),
            },
        }
    }
}

/// Convert ApiError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: ApiError) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(err.rpc_code(), err.message(), None::<()>)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            message: self.message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
