// GhProfile Infrastructure - In-Memory Adapter
// Implements: JobRepository (no persistence, final jobs kept for a retention period)

mod job_repository;

pub use job_repository::{
    InMemoryJobRepository, RetentionPolicy, DEFAULT_MAX_FINISHED, DEFAULT_RETENTION,
};
