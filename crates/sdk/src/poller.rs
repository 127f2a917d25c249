//! Job status poller
//!
//! Drives one execution id from `idle` through `polling` to `terminal`.
//! Requests are issued once per interval while the consumer is in the
//! foreground; in the background nothing is sent, and regaining the
//! foreground triggers an immediate refetch.

use crate::error::Result;
use crate::types::{JobState, JobStatus};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(5 * 60);

/// Anything that can report the status of an execution id
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn fetch_status(&self, id: &str) -> Result<JobStatus>;
}

#[async_trait]
impl<T: JobStatusSource + ?Sized> JobStatusSource for Arc<T> {
    async fn fetch_status(&self, id: &str) -> Result<JobStatus> {
        (**self).fetch_status(id).await
    }
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    /// `None` polls until a terminal status or an explicit stop
    pub max_wait: Option<Duration>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: Some(DEFAULT_MAX_WAIT),
        }
    }
}

/// How a poll ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Generated text, exactly as reported
    Completed(String),
    Failed(String),
    Cancelled,
    TimedOut,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling { id: String },
    Terminal(PollOutcome),
}

/// Foreground and stop switches, usable from another task while polling
#[derive(Clone)]
pub struct PollerControl {
    foreground: Arc<watch::Sender<bool>>,
    stop: Arc<watch::Sender<bool>>,
}

impl PollerControl {
    pub fn set_foreground(&self, foreground: bool) {
        self.foreground.send_replace(foreground);
    }

    /// End the current poll with [`PollOutcome::Stopped`]
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }
}

pub struct JobStatusPoller<S> {
    source: S,
    config: PollerConfig,
    state: PollState,
    control: PollerControl,
    foreground: watch::Receiver<bool>,
    stop: watch::Receiver<bool>,
}

impl<S: JobStatusSource> JobStatusPoller<S> {
    /// New poller in `idle`, starting in the foreground
    pub fn new(source: S, config: PollerConfig) -> Self {
        let (fg_tx, foreground) = watch::channel(true);
        let (stop_tx, stop) = watch::channel(false);
        Self {
            source,
            config,
            state: PollState::Idle,
            control: PollerControl {
                foreground: Arc::new(fg_tx),
                stop: Arc::new(stop_tx),
            },
            foreground,
            stop,
        }
    }

    pub fn control(&self) -> PollerControl {
        self.control.clone()
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Execution id currently being polled, cleared once terminal
    pub fn execution_id(&self) -> Option<&str> {
        match &self.state {
            PollState::Polling { id } => Some(id),
            _ => None,
        }
    }

    /// Poll `id` until it reaches a terminal status.
    ///
    /// A stop requested before this call is discarded.
    pub async fn start(&mut self, id: impl Into<String>) -> PollOutcome {
        let id = id.into();
        self.control.stop.send_replace(false);
        self.state = PollState::Polling { id: id.clone() };
        info!(job_id = %id, "Polling job status");

        let outcome = self.poll_loop(&id).await;

        info!(job_id = %id, outcome = ?outcome, "Polling finished");
        self.state = PollState::Terminal(outcome.clone());
        outcome
    }

    async fn poll_loop(&mut self, id: &str) -> PollOutcome {
        let deadline = self.config.max_wait.map(|d| Instant::now() + d);

        loop {
            if !*self.foreground.borrow_and_update() {
                debug!(job_id = %id, "In background, polling suppressed");
                tokio::select! {
                    _ = wait_true(&mut self.foreground) => {
                        debug!(job_id = %id, "Foreground regained, refetching");
                    }
                    _ = wait_true(&mut self.stop) => return PollOutcome::Stopped,
                    _ = deadline_elapsed(deadline) => return PollOutcome::TimedOut,
                }
            }

            // A hung request must not outlive the deadline or a stop
            let fetched = tokio::select! {
                fetched = self.source.fetch_status(id) => fetched,
                _ = wait_true(&mut self.stop) => return PollOutcome::Stopped,
                _ = deadline_elapsed(deadline) => return PollOutcome::TimedOut,
            };

            match fetched {
                Ok(status) => {
                    if let Some(outcome) = terminal_outcome(status) {
                        return outcome;
                    }
                }
                Err(e) => warn!(job_id = %id, error = %e, "Status request failed"),
            }

            tokio::select! {
                _ = sleep(self.config.interval) => {}
                _ = wait_true(&mut self.stop) => return PollOutcome::Stopped,
                _ = deadline_elapsed(deadline) => return PollOutcome::TimedOut,
            }
        }
    }
}

/// Map a status report to a terminal outcome, if it is one
pub fn terminal_outcome(status: JobStatus) -> Option<PollOutcome> {
    match status.state {
        // Checked first so a cancelled job never surfaces a stale result
        JobState::Cancelled => Some(PollOutcome::Cancelled),
        JobState::Failed => Some(PollOutcome::Failed(
            status
                .error
                .unwrap_or_else(|| "generation failed".to_string()),
        )),
        JobState::Succeeded => Some(PollOutcome::Completed(status.result.unwrap_or_default())),
        JobState::Created | JobState::Started => match status.result {
            Some(text) if !text.is_empty() => Some(PollOutcome::Completed(text)),
            _ => None,
        },
    }
}

async fn wait_true(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|v| *v).await;
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
