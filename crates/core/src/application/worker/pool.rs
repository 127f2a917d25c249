// Bounded worker pool - one worker per concurrent pipeline run

use super::{RunningJobs, ShutdownToken, Worker};
use crate::application::generation::ProfileGenerationJob;
use crate::port::{JobRepository, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Fixed set of workers sharing one job table.
///
/// The pool size is the concurrency cap: at most `size` pipelines run at
/// once, further jobs wait in `created`.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(
        size: usize,
        job_repo: Arc<dyn JobRepository>,
        pipeline: Arc<ProfileGenerationJob>,
        time_provider: Arc<dyn TimeProvider>,
        running: Arc<RunningJobs>,
        shutdown: ShutdownToken,
    ) -> Self {
        let size = size.max(1);
        let handles = (0..size)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    Arc::clone(&job_repo),
                    Arc::clone(&pipeline),
                    Arc::clone(&time_provider),
                    Arc::clone(&running),
                );
                let token = shutdown.clone();
                tokio::spawn(async move {
                    if let Err(e) = worker.run(token).await {
                        tracing::error!(worker = id, error = ?e, "Worker failed");
                    }
                })
            })
            .collect();

        info!(workers = size, "Worker pool started");
        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait for all workers after shutdown was signalled, up to `grace`
    pub async fn join(self, grace: Duration) {
        let all = join_handles(self.handles);
        if tokio::time::timeout(grace, all).await.is_err() {
            warn!(grace_ms = grace.as_millis() as u64, "Workers still busy after grace period");
        }
    }
}

async fn join_handles(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}
