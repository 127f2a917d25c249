//! REST Client Implementation

use crate::error::{Result, SdkError};
use crate::poller::JobStatusSource;
use crate::types::{ErrorBody, JobStatus, SubmitResponse};
use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

/// Client for the daemon's REST surface
pub struct RestClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    /// # Arguments
    ///
    /// * `base_url` - e.g. `http://127.0.0.1:8080`
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| SdkError::InvalidUrl(format!("{}: {}", base_url.as_ref(), e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SdkError::InvalidUrl(base_url.to_string()));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;
        Ok(Self { client, base_url })
    }

    /// `{base}/profile/{segments...}`, each segment percent-encoded
    fn profile_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("profile").extend(segments);
        }
        url
    }

    /// `POST /profile/:username[/:mods]`
    pub async fn submit<S: AsRef<str>>(&self, username: &str, mods: &[S]) -> Result<SubmitResponse> {
        let mods: Vec<&str> = mods.iter().map(AsRef::as_ref).collect();
        let joined = mods.join(",");
        let url = if mods.is_empty() {
            self.profile_url(&[username])
        } else {
            self.profile_url(&[username, &joined])
        };
        debug!(%url, "Submitting profile job");
        let response = self.client.post(url).send().await?;
        read_json(response).await
    }

    pub async fn status(&self, id: &str) -> Result<JobStatus> {
        let response = self.client.get(self.profile_url(&[id])).send().await?;
        read_json(response).await
    }

    /// `DELETE /profile/:id`, returning the job after cancellation
    pub async fn cancel(&self, id: &str) -> Result<JobStatus> {
        let response = self.client.delete(self.profile_url(&[id])).send().await?;
        read_json(response).await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(err) => SdkError::Http {
                status: status.as_u16(),
                kind: err.error,
                message: err.message,
            },
            Err(_) => SdkError::Http {
                status: status.as_u16(),
                kind: "unknown".to_string(),
                message: String::from_utf8_lossy(&body).into_owned(),
            },
        });
    }
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl JobStatusSource for RestClient {
    async fn fetch_status(&self, id: &str) -> Result<JobStatus> {
        self.status(id).await
    }
}
