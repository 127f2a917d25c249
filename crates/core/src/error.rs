// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    /// Missing or unusable credentials / settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Code-hosting API unreachable, rate-limited, or user not found
    #[error("Upstream fetch error: {0}")]
    UpstreamFetch(String),

    /// Completion API failure or empty result
    #[error("Upstream generation error: {0}")]
    UpstreamGeneration(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: reqwest::Error conversion is handled in infra-upstream crate
// by converting to AppError::UpstreamFetch / UpstreamGeneration(String)
