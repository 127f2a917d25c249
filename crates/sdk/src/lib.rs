//! GitHub profile generator SDK
//!
//! Clients for the daemon's JSON-RPC and REST surfaces, plus a status
//! poller that works over either.
//!
//! # Example
//!
//! ```no_run
//! use ghprofile_sdk::{GhProfileClient, JobStatusPoller, PollOutcome, PollerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GhProfileClient::connect("http://127.0.0.1:9527").await?;
//!     let submitted = client.submit("octocat", &["rick_astley"]).await?;
//!
//!     let mut poller = JobStatusPoller::new(client, PollerConfig::default());
//!     if let PollOutcome::Completed(text) = poller.start(submitted.id).await {
//!         println!("{}", text);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
pub mod poller;
mod rest;
mod types;

pub use client::GhProfileClient;
pub use error::{Result, SdkError};
pub use poller::{
    JobStatusPoller, JobStatusSource, PollOutcome, PollState, PollerConfig, PollerControl,
};
pub use rest::RestClient;
pub use types::{CancelResponse, JobState, JobStatus, SubmitResponse};
