// Port Layer - Interfaces for external dependencies

pub mod completion;
pub mod github;
pub mod id_provider; // For deterministic testing
pub mod job_repository;
pub mod time_provider;

// Re-exports
pub use completion::{CompletionClient, SamplingConfig};
pub use github::GithubInfoFetcher;
pub use id_provider::IdProvider;
pub use job_repository::{JobOutcome, JobRepository};
pub use time_provider::TimeProvider;
