// Job Repository Port (Interface)

use crate::domain::{GenerationJob, JobId};
use crate::error::Result;
use async_trait::async_trait;

/// How a pipeline run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded(String),
    Failed(String),
}

/// Job table keyed by execution id
///
/// Implementations must make `claim_next`, `finish` and `cancel` atomic with
/// respect to each other: a job is claimed by at most one worker, and a job
/// cancelled while running keeps its `cancelled` state.
///
/// Final jobs may be evicted after a retention period; lookups of an
/// evicted id return `None`.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a new job
    async fn insert(&self, job: &GenerationJob) -> Result<()>;

    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<GenerationJob>>;

    /// Move the oldest `created` job to `started` and return it
    async fn claim_next(&self, now_millis: i64) -> Result<Option<GenerationJob>>;

    /// Record the outcome of a `started` job.
    ///
    /// Returns `false` (and changes nothing) when the job left `started`
    /// in the meantime, e.g. because it was cancelled.
    async fn finish(&self, id: &JobId, outcome: JobOutcome, now_millis: i64) -> Result<bool>;

    /// Cancel a job that is not final yet and return its new snapshot
    async fn cancel(&self, id: &JobId, now_millis: i64) -> Result<GenerationJob>;
}
