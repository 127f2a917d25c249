// In-Memory JobRepository Implementation

use async_trait::async_trait;
use ghprofile_core::domain::{GenerationJob, JobId, JobState};
use ghprofile_core::error::{AppError, Result};
use ghprofile_core::port::{JobOutcome, JobRepository};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

pub const DEFAULT_RETENTION: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_FINISHED: usize = 10_000;

/// How long final jobs stay queryable
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    /// Age after reaching a final state
    pub ttl: Duration,
    /// Upper bound on stored final jobs, oldest evicted first
    pub max_finished: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_RETENTION,
            max_finished: DEFAULT_MAX_FINISHED,
        }
    }
}

#[derive(Default)]
struct JobTable {
    jobs: HashMap<JobId, GenerationJob>,
    /// Submission order of jobs that may still be `created`
    pending: VecDeque<JobId>,
    /// Final jobs in the order they finished
    finished: VecDeque<(JobId, i64)>,
}

impl JobTable {
    fn evict(&mut self, policy: &RetentionPolicy, now_millis: i64) {
        let ttl_ms = policy.ttl.as_millis() as i64;
        let mut evicted = 0usize;
        while let Some(finished_at) = self.finished.front().map(|(_, at)| *at) {
            let over_cap = self.finished.len() > policy.max_finished;
            if !over_cap && now_millis.saturating_sub(finished_at) < ttl_ms {
                break;
            }
            if let Some((id, _)) = self.finished.pop_front() {
                self.jobs.remove(&id);
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!(evicted, remaining = self.jobs.len(), "Evicted final jobs");
        }
    }
}

/// Job table guarded by a single async lock.
///
/// Every mutation takes the write lock, which makes claim / finish / cancel
/// atomic with respect to each other. Final jobs are evicted on later
/// mutations once the retention policy says so; idle workers call
/// `claim_next` continuously, so eviction does not depend on new traffic.
#[derive(Default)]
pub struct InMemoryJobRepository {
    table: RwLock<JobTable>,
    retention: RetentionPolicy,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: RetentionPolicy) -> Self {
        Self {
            table: RwLock::default(),
            retention,
        }
    }

    /// Number of jobs currently stored
    pub async fn len(&self) -> usize {
        self.table.read().await.jobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

// Domain transition errors surface as conflicts at the API boundary
fn map_domain_error(err: ghprofile_core::domain::DomainError) -> AppError {
    AppError::InvalidState(err.to_string())
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn insert(&self, job: &GenerationJob) -> Result<()> {
        let mut table = self.table.write().await;
        table.evict(&self.retention, job.created_at);
        if table.jobs.contains_key(&job.id) {
            return Err(AppError::InvalidState(format!(
                "Job {} already exists",
                job.id
            )));
        }
        if job.state == JobState::Created {
            table.pending.push_back(job.id.clone());
        }
        table.jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<GenerationJob>> {
        Ok(self.table.read().await.jobs.get(id).cloned())
    }

    async fn claim_next(&self, now_millis: i64) -> Result<Option<GenerationJob>> {
        let mut table = self.table.write().await;
        table.evict(&self.retention, now_millis);
        while let Some(id) = table.pending.pop_front() {
            let Some(job) = table.jobs.get_mut(&id) else {
                continue;
            };
            // Cancelled before any worker got to it
            if job.state != JobState::Created {
                debug!(job_id = %id, state = %job.state, "Skipping non-created job");
                continue;
            }
            job.start(now_millis).map_err(map_domain_error)?;
            return Ok(Some(job.clone()));
        }
        Ok(None)
    }

    async fn finish(&self, id: &JobId, outcome: JobOutcome, now_millis: i64) -> Result<bool> {
        let mut table = self.table.write().await;
        // Already cancelled and evicted
        let Some(job) = table.jobs.get_mut(id) else {
            return Ok(false);
        };

        if job.state != JobState::Started {
            return Ok(false);
        }

        let transition = match outcome {
            JobOutcome::Succeeded(text) => job.succeed(text, now_millis),
            JobOutcome::Failed(message) => job.fail(message, now_millis),
        };
        transition.map_err(map_domain_error)?;

        table.finished.push_back((id.clone(), now_millis));
        table.evict(&self.retention, now_millis);
        Ok(true)
    }

    async fn cancel(&self, id: &JobId, now_millis: i64) -> Result<GenerationJob> {
        let mut table = self.table.write().await;
        let job = table
            .jobs
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))?;
        job.cancel(now_millis).map_err(map_domain_error)?;
        let snapshot = job.clone();

        table.finished.push_back((id.clone(), now_millis));
        Ok(snapshot)
    }
}
