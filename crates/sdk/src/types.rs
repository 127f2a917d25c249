//! SDK Request/Response Types
//!
//! Mirrors the wire types of the daemon's API crate.

use serde::Deserialize;

/// Lifecycle state reported by the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Created,
    Started,
    Succeeded,
    Failed,
    Cancelled,
}

/// Response from submit
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub id: String,
    /// Absent on the REST surface, which only returns the id
    pub state: Option<JobState>,
}

/// Job snapshot as stored by the daemon
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobStatus {
    pub id: String,
    pub state: JobState,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from the RPC cancel method
#[derive(Debug, Clone, Deserialize)]
pub struct CancelResponse {
    pub id: String,
    pub cancelled: bool,
}

/// REST error body
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    pub message: String,
}
