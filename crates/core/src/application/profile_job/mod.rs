// Profile Job Service - submit / status / cancel use cases

pub mod submit;

pub use submit::SubmitRequest;

use crate::application::worker::RunningJobs;
use crate::domain::{GenerationJob, JobId};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, JobRepository, TimeProvider};
use std::sync::Arc;
use tracing::info;

/// Profile Job Service
pub struct ProfileJobService {
    job_repo: Arc<dyn JobRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    running: Arc<RunningJobs>,
}

impl ProfileJobService {
    pub fn new(
        job_repo: Arc<dyn JobRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            job_repo,
            id_provider,
            time_provider,
            running: Arc::new(RunningJobs::new()),
        }
    }

    /// Share the worker pool's registry so cancel can abort running pipelines
    pub fn with_running_jobs(mut self, running: Arc<RunningJobs>) -> Self {
        self.running = running;
        self
    }

    /// Submit a new generation job and return its execution id
    pub async fn submit(&self, req: SubmitRequest) -> Result<JobId> {
        submit::execute(
            self.job_repo.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await
    }

    /// Current snapshot of a job, exactly as stored
    pub async fn status(&self, id: &JobId) -> Result<GenerationJob> {
        self.job_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))
    }

    /// Cancel a job that has not finished yet
    pub async fn cancel(&self, id: &JobId) -> Result<GenerationJob> {
        let now = self.time_provider.now_millis();
        let job = self.job_repo.cancel(id, now).await?;
        let was_running = self.running.signal(id).await;
        info!(job_id = %job.id, was_running, "Job cancelled");
        Ok(job)
    }
}
