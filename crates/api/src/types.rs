//! Request/Response Types
//!
//! Shared by the REST routes and the JSON-RPC methods.

use ghprofile_core::domain::{GenerationJob, JobState};
use serde::{Deserialize, Serialize};

/// profile.submit.v1 - Submit a generation job
#[derive(Debug, Deserialize)]
pub struct SubmitParams {
    pub username: String,
    #[serde(default)]
    pub mods: Vec<String>,
}

/// Returned immediately, before the job runs
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub id: String,
    pub state: JobState,
}

/// profile.status.v1 - Current job state
#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub id: String,
}

/// `{id, state, result?, error?}` exactly as stored
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusResponse {
    pub id: String,
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<GenerationJob> for JobStatusResponse {
    fn from(job: GenerationJob) -> Self {
        Self {
            id: job.id,
            state: job.state,
            result: job.result,
            error: job.error,
        }
    }
}

/// profile.cancel.v1 - Cancel a job
#[derive(Debug, Deserialize)]
pub struct CancelParams {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelResponse {
    pub id: String,
    pub cancelled: bool,
}

/// REST error body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_omits_absent_fields() {
        let job = GenerationJob::new_test("octocat");
        let value = serde_json::to_value(JobStatusResponse::from(job.clone())).unwrap();
        assert_eq!(value, json!({ "id": job.id, "state": "created" }));
    }

    #[test]
    fn test_status_carries_result_verbatim() {
        let mut job = GenerationJob::new_test("octocat");
        job.start(1).unwrap();
        job.succeed("\n# Me\n".to_string(), 2).unwrap();
        let value = serde_json::to_value(JobStatusResponse::from(job)).unwrap();
        assert_eq!(value["state"], "succeeded");
        assert_eq!(value["result"], "\n# Me\n");
    }

    #[test]
    fn test_submit_params_mods_optional() {
        let params: SubmitParams = serde_json::from_value(json!({ "username": "a" })).unwrap();
        assert!(params.mods.is_empty());
    }
}
