// Worker - Job execution loop

pub mod constants;
mod pool;
mod running;
mod shutdown;

use constants::*;
pub use pool::WorkerPool;
pub use running::RunningJobs;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::generation::ProfileGenerationJob;
use crate::domain::{GenerationJob, JobState};
use crate::error::Result;
use crate::port::{JobOutcome, JobRepository, TimeProvider};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Worker claims created jobs from the job table and runs the pipeline
pub struct Worker {
    id: usize,
    job_repo: Arc<dyn JobRepository>,
    pipeline: Arc<ProfileGenerationJob>,
    time_provider: Arc<dyn TimeProvider>,
    running: Arc<RunningJobs>,
}

impl Worker {
    pub fn new(
        id: usize,
        job_repo: Arc<dyn JobRepository>,
        pipeline: Arc<ProfileGenerationJob>,
        time_provider: Arc<dyn TimeProvider>,
        running: Arc<RunningJobs>,
    ) -> Self {
        Self {
            id,
            job_repo,
            pipeline,
            time_provider,
            running,
        }
    }

    /// Run worker loop with graceful shutdown support
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(worker = self.id, "Worker started");
        loop {
            if shutdown.is_shutdown() {
                info!(worker = self.id, "Worker shutting down");
                break;
            }
            match self.process_next_job().await {
                Ok(true) => {}
                Ok(false) => {
                    // No job available, sleep briefly (or wait for shutdown)
                    tokio::select! {
                        _ = sleep(IDLE_SLEEP_DURATION) => {},
                        _ = shutdown.wait() => {
                            info!(worker = self.id, "Worker interrupted during idle");
                            break;
                        }
                    }
                }
                Err(e) => {
                    error!(worker = self.id, "Worker error: {}", e);
                    tokio::select! {
                        _ = sleep(ERROR_RECOVERY_SLEEP_DURATION) => {},
                        _ = shutdown.wait() => {
                            info!(worker = self.id, "Worker interrupted during error recovery");
                            break;
                        }
                    }
                }
            }
        }
        info!(worker = self.id, "Worker stopped");
        Ok(())
    }

    /// Process next created job (returns true if a job was processed)
    pub async fn process_next_job(&self) -> Result<bool> {
        // Claim atomically moves the job to STARTED
        let job = match self
            .job_repo
            .claim_next(self.time_provider.now_millis())
            .await?
        {
            Some(j) => j,
            None => return Ok(false),
        };

        info!(worker = self.id, job_id = %job.id, username = %job.username, "Processing job");

        let mut cancelled = self.running.register(&job.id).await;
        let result = self.execute(&job, &mut cancelled).await;
        self.running.remove(&job.id).await;
        result.map(|_| true)
    }

    async fn execute(&self, job: &GenerationJob, cancelled: &mut ShutdownToken) -> Result<()> {
        // Cancelled between claim and registration
        let still_started = matches!(
            self.job_repo.find_by_id(&job.id).await?,
            Some(ref stored) if stored.state == JobState::Started
        );
        if !still_started {
            info!(worker = self.id, job_id = %job.id, "Job cancelled before the pipeline started");
            return Ok(());
        }

        // Panic isolation: a panicking pipeline must not kill the worker
        let pipeline = Arc::clone(&self.pipeline);
        let username = job.username.clone();
        let mods = job.mods.clone();
        let mut handle = tokio::task::spawn(async move { pipeline.run(&username, &mods).await });

        let joined = tokio::select! {
            joined = &mut handle => joined,
            _ = cancelled.wait() => {
                handle.abort();
                info!(worker = self.id, job_id = %job.id, "Job cancelled, pipeline aborted");
                return Ok(());
            }
        };

        let outcome = match joined {
            Ok(Ok(text)) => JobOutcome::Succeeded(text),
            Ok(Err(e)) => {
                warn!(job_id = %job.id, error = %e, "Job failed");
                JobOutcome::Failed(e.to_string())
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    error!("Job panicked {}: {:?}", job.id, join_err);
                } else {
                    error!("Job aborted {}: {:?}", job.id, join_err);
                }
                JobOutcome::Failed("generation task panicked".to_string())
            }
        };

        let succeeded = matches!(outcome, JobOutcome::Succeeded(_));
        let now = self.time_provider.now_millis();
        if self.job_repo.finish(&job.id, outcome, now).await? {
            info!(job_id = %job.id, succeeded, "Job finished");
        } else {
            info!(job_id = %job.id, "Job left STARTED while running, outcome discarded");
        }
        Ok(())
    }
}
