//! JSON-RPC Client Implementation

use crate::error::{Result, SdkError};
use crate::poller::JobStatusSource;
use crate::types::{CancelResponse, JobStatus, SubmitResponse};
use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use std::time::Duration;

/// Client for the daemon's JSON-RPC surface
///
/// # Example
///
/// ```no_run
/// use ghprofile_sdk::GhProfileClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GhProfileClient::connect("http://127.0.0.1:9527").await?;
/// let submitted = client.submit("octocat", &["yoda"]).await?;
/// let status = client.status(&submitted.id).await?;
/// println!("{:?}", status.state);
/// # Ok(())
/// # }
/// ```
pub struct GhProfileClient {
    client: HttpClient,
}

impl GhProfileClient {
    /// Connect to the daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9527`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Submit a generation job; returns as soon as the job is recorded
    pub async fn submit<S: AsRef<str>>(&self, username: &str, mods: &[S]) -> Result<SubmitResponse> {
        let mods: Vec<&str> = mods.iter().map(AsRef::as_ref).collect();
        let mut params = ObjectParams::new();
        params.insert("username", username)?;
        params.insert("mods", mods)?;
        Ok(self.client.request("profile.submit.v1", params).await?)
    }

    pub async fn status(&self, id: &str) -> Result<JobStatus> {
        let mut params = ObjectParams::new();
        params.insert("id", id)?;
        Ok(self.client.request("profile.status.v1", params).await?)
    }

    pub async fn cancel(&self, id: &str) -> Result<CancelResponse> {
        let mut params = ObjectParams::new();
        params.insert("id", id)?;
        Ok(self.client.request("profile.cancel.v1", params).await?)
    }
}

#[async_trait]
impl JobStatusSource for GhProfileClient {
    async fn fetch_status(&self, id: &str) -> Result<JobStatus> {
        self.status(id).await
    }
}
