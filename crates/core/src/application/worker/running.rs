// Running jobs - cancel signals for pipelines a worker is executing

use super::shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
use crate::domain::JobId;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Shared between the worker pool and the job service.
///
/// A worker registers the job it claimed; cancelling that job signals the
/// token so the worker can abort the pipeline task and free its slot.
#[derive(Default)]
pub struct RunningJobs {
    senders: Mutex<HashMap<JobId, ShutdownSender>>,
}

impl RunningJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `id` and return the token its worker watches
    pub async fn register(&self, id: &JobId) -> ShutdownToken {
        let (tx, token) = shutdown_channel();
        self.senders.lock().await.insert(id.clone(), tx);
        token
    }

    /// Signal the worker running `id`. Returns false if no worker runs it.
    pub async fn signal(&self, id: &JobId) -> bool {
        match self.senders.lock().await.get(id) {
            Some(tx) => {
                tx.shutdown();
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, id: &JobId) {
        self.senders.lock().await.remove(id);
    }

    pub async fn len(&self) -> usize {
        self.senders.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_reaches_registered_token() {
        let running = RunningJobs::new();
        let id = "job-1".to_string();
        let mut token = running.register(&id).await;
        assert!(!token.is_shutdown());

        assert!(running.signal(&id).await);
        tokio::time::timeout(Duration::from_millis(100), token.wait())
            .await
            .expect("token should be signalled");
    }

    #[tokio::test]
    async fn test_signal_unknown_job_is_noop() {
        let running = RunningJobs::new();
        let token = running.register(&"other".to_string()).await;
        assert!(!running.signal(&"missing".to_string()).await);
        assert!(!token.is_shutdown());
    }

    #[tokio::test]
    async fn test_remove_forgets_job() {
        let running = RunningJobs::new();
        let id = "job-1".to_string();
        let _token = running.register(&id).await;
        assert_eq!(running.len().await, 1);

        running.remove(&id).await;
        assert!(running.is_empty().await);
        assert!(!running.signal(&id).await);
    }
}
