// Application Layer - Use Cases and Business Logic

pub mod generation;
pub mod profile_job;
pub mod prompt;
pub mod worker;

// Re-exports
pub use generation::ProfileGenerationJob;
pub use profile_job::ProfileJobService;
pub use prompt::PromptComposer;
pub use worker::{
    shutdown_channel, RunningJobs, ShutdownSender, ShutdownToken, Worker, WorkerPool,
};
