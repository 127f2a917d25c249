// Domain Layer - Pure business logic and entities

pub mod error;
pub mod job;
pub mod mods;
pub mod profile;

// Re-exports
pub use error::DomainError;
pub use job::{GenerationJob, JobId, JobState};
pub use mods::{Mod, ModSet};
pub use profile::{LanguageBytes, LanguageSize, ProfileQueryResult, RawProfile};
