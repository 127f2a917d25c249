//! Request handlers shared by the REST and JSON-RPC surfaces

use crate::error::ApiError;
use crate::rate_limiter::RateLimiter;
use crate::types::{CancelResponse, JobStatusResponse, SubmitResponse};
use ghprofile_core::application::profile_job::SubmitRequest;
use ghprofile_core::application::ProfileJobService;
use ghprofile_core::domain::{JobState, ModSet};
use ghprofile_core::error::AppError;
use std::sync::Arc;
use tracing::{debug, warn};

/// Handler with injected dependencies
pub struct ApiHandler {
    service: Arc<ProfileJobService>,
    rate_limiter: Arc<RateLimiter>,
}

impl ApiHandler {
    pub fn new(service: Arc<ProfileJobService>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            service,
            rate_limiter,
        }
    }

    /// Record a new job and return its id without waiting for generation
    pub async fn submit<I, S>(&self, username: &str, mods: I) -> Result<SubmitResponse, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.rate_limiter.try_acquire() {
            warn!(username, "Submission throttled");
            return Err(ApiError::Throttled);
        }

        let mods = ModSet::from_names(mods).map_err(|e| AppError::MalformedInput(e.to_string()))?;
        let id = self
            .service
            .submit(SubmitRequest::new(username, mods))
            .await?;

        debug!(job_id = %id, "Submission accepted");
        Ok(SubmitResponse {
            id,
            state: JobState::Created,
        })
    }

    /// Submit with mods taken from a comma-delimited path segment
    pub async fn submit_delimited(
        &self,
        username: &str,
        segment: &str,
    ) -> Result<SubmitResponse, ApiError> {
        self.submit(username, segment.split(',')).await
    }

    pub async fn status(&self, id: &str) -> Result<JobStatusResponse, ApiError> {
        let job = self.service.status(&id.to_string()).await?;
        Ok(job.into())
    }

    /// Cancel and return the resulting job snapshot
    pub async fn cancel_job(&self, id: &str) -> Result<JobStatusResponse, ApiError> {
        let job = self.service.cancel(&id.to_string()).await?;
        Ok(job.into())
    }

    pub async fn cancel(&self, id: &str) -> Result<CancelResponse, ApiError> {
        let status = self.cancel_job(id).await?;
        Ok(CancelResponse {
            cancelled: status.state == JobState::Cancelled,
            id: status.id,
        })
    }
}
