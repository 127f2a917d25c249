// Code-Hosting API Port

use crate::domain::ProfileQueryResult;
use crate::error::Result;
use async_trait::async_trait;

/// Fetches and normalizes public profile data for one username
#[async_trait]
pub trait GithubInfoFetcher: Send + Sync {
    /// Issue one authenticated query for `username`
    ///
    /// # Errors
    /// - AppError::UpstreamFetch if the API is unreachable, rate-limited,
    ///   or the user does not exist
    async fn fetch(&self, username: &str) -> Result<ProfileQueryResult>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{LanguageSize, RawProfile};
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// Mock fetcher behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Return this profile for any username
        Profile(ProfileQueryResult),
        /// Fail with an upstream fetch error
        Fail(String),
    }

    /// Mock GithubInfoFetcher for testing
    pub struct MockGithubFetcher {
        behavior: Arc<Mutex<MockBehavior>>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl MockGithubFetcher {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                requested: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Profile with a README, one repository and a few stars
        pub fn new_success() -> Self {
            Self::new(MockBehavior::Profile(ProfileQueryResult::from_raw(
                RawProfile {
                    login: "octocat".to_string(),
                    bio: Some("Mascot".to_string()),
                    location: Some("San Francisco".to_string()),
                    readme: Some("# Hello".to_string()),
                    stargazer_counts: vec![42],
                    repository_languages: vec![vec![LanguageSize::new(
                        "Rust", 1024,
                    )]],
                },
            )))
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn call_count(&self) -> usize {
            self.requested.lock().unwrap().len()
        }

        pub fn requested_usernames(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GithubInfoFetcher for MockGithubFetcher {
        async fn fetch(&self, username: &str) -> Result<ProfileQueryResult> {
            self.requested.lock().unwrap().push(username.to_string());

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockBehavior::Profile(mut profile) => {
                    profile.username = username.to_string();
                    Ok(profile)
                }
                MockBehavior::Fail(msg) => Err(AppError::UpstreamFetch(msg)),
            }
        }
    }
}
