// Submit Use Case

use crate::domain::{GenerationJob, JobId, ModSet};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, JobRepository, TimeProvider};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Submit request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub username: String,

    #[serde(default)]
    pub mods: ModSet,
}

impl SubmitRequest {
    pub fn new(username: impl Into<String>, mods: ModSet) -> Self {
        Self {
            username: username.into(),
            mods,
        }
    }
}

/// Usernames must be non-empty; anything else is left to the upstream API
pub fn validate_request(req: &SubmitRequest) -> Result<()> {
    if req.username.trim().is_empty() {
        return Err(AppError::MalformedInput(
            "username must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Execute submit use case
///
/// Only records the job; a worker picks it up later. The execution id is
/// returned before any upstream call happens.
///
/// # Arguments
///
/// * `job_repo` - Job table
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `req` - Submit request
pub async fn execute(
    job_repo: &dyn JobRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: SubmitRequest,
) -> Result<JobId> {
    validate_request(&req)?;

    let job = GenerationJob::new(
        id_provider.generate_id(),
        time_provider.now_millis(),
        req.username.trim(),
        req.mods,
    );

    job_repo.insert(&job).await?;
    info!(job_id = %job.id, username = %job.username, "Job submitted");

    Ok(job.id)
}

#[cfg(test)]
#[path = "submit_test.rs"]
mod submit_test;
