// Shared HTTP client construction

use ghprofile_core::error::{AppError, Result};
use std::time::Duration;

/// Settings common to both upstream clients
#[derive(Debug, Clone, Default)]
pub struct UpstreamHttpConfig {
    /// Per-request timeout; `None` leaves requests unbounded
    pub timeout: Option<Duration>,
}

pub(crate) const USER_AGENT: &str = concat!("ghprofile/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(config: &UpstreamHttpConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Credentials must be present and non-blank
pub(crate) fn require_secret(name: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Configuration(format!("{} is not set", name)));
    }
    Ok(value.to_string())
}
