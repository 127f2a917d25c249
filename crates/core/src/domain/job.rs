// Generation Job Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::mods::ModSet;
use serde::{Deserialize, Serialize};

/// Execution ID (UUID v4 in production)
pub type JobId = String;

/// Job State
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Created,
    Started,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    /// Final states never change again
    pub fn is_final(self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Created => "created",
            JobState::Started => "started",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "created" => Ok(JobState::Created),
            "started" => Ok(JobState::Started),
            "succeeded" => Ok(JobState::Succeeded),
            "failed" => Ok(JobState::Failed),
            "cancelled" => Ok(JobState::Cancelled),
            other => Err(DomainError::ValidationError(format!(
                "unknown job state: {}",
                other
            ))),
        }
    }
}

/// Generation Job Entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    pub id: JobId,
    pub username: String,
    pub mods: ModSet,
    pub state: JobState,

    pub result: Option<String>,
    pub error: Option<String>,

    pub created_at: i64, // epoch ms
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
}

impl GenerationJob {
    /// Create a new job in `created` state
    ///
    /// # Arguments
    ///
    /// * `id` - Unique execution ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `username` - GitHub login the profile is generated for
    /// * `mods` - Stylistic toggles applied to the prompt
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        username: impl Into<String>,
        mods: ModSet,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            mods,
            state: JobState::Created,
            result: None,
            error: None,
            created_at,
            started_at: None,
            finished_at: None,
        }
    }

    /// Create a test job with deterministic ID and timestamp.
    ///
    /// **Note**: This method should only be used in tests. For production code,
    /// always inject ID and time via providers.
    pub fn new_test(username: impl Into<String>) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        Self::new(
            format!("test-{}", counter),
            (counter * 1000) as i64,
            username,
            ModSet::default(),
        )
    }

    fn transition_error(&self, to: JobState) -> DomainError {
        DomainError::InvalidStateTransition {
            from: self.state.to_string(),
            to: to.to_string(),
        }
    }

    /// Transition to Started state with explicit timestamp
    pub fn start(&mut self, now_millis: i64) -> Result<()> {
        if self.state != JobState::Created {
            return Err(self.transition_error(JobState::Started));
        }
        self.state = JobState::Started;
        self.started_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Succeeded, storing the generated text untouched
    pub fn succeed(&mut self, result: String, now_millis: i64) -> Result<()> {
        if self.state != JobState::Started {
            return Err(self.transition_error(JobState::Succeeded));
        }
        self.state = JobState::Succeeded;
        self.result = Some(result);
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Failed with the error message
    pub fn fail(&mut self, error: impl Into<String>, now_millis: i64) -> Result<()> {
        if self.state != JobState::Started {
            return Err(self.transition_error(JobState::Failed));
        }
        self.state = JobState::Failed;
        self.error = Some(error.into());
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// Cancel a job that has not reached a final state
    pub fn cancel(&mut self, now_millis: i64) -> Result<()> {
        if self.state.is_final() {
            return Err(self.transition_error(JobState::Cancelled));
        }
        self.state = JobState::Cancelled;
        self.finished_at = Some(now_millis);
        Ok(())
    }
}
