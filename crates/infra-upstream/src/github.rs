// GitHub GraphQL GithubInfoFetcher Implementation

use crate::http::{build_client, require_secret, UpstreamHttpConfig};
use async_trait::async_trait;
use ghprofile_core::domain::{LanguageSize, ProfileQueryResult, RawProfile};
use ghprofile_core::error::{AppError, Result};
use ghprofile_core::port::GithubInfoFetcher;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

pub const DEFAULT_GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// One round trip: rate limit, profile README, language and star stats.
///
/// The profile README lives in the `<login>/<login>` repository on `master`.
const PROFILE_QUERY: &str = r#"
query userInfo($login: String!) {
  rateLimit {
    limit
    cost
    remaining
    resetAt
  }
  repository(owner: $login, name: $login) {
    object(expression: "master:README.md") {
      ... on Blob {
        text
      }
    }
  }
  user(login: $login) {
    bio
    login
    location
    reposLangs: repositories(ownerAffiliations: OWNER, first: 10) {
      nodes {
        name
        languages(first: 10, orderBy: { field: SIZE, direction: DESC }) {
          edges {
            size
            node {
              name
            }
          }
        }
      }
    }
    reposStars: repositories(first: 10, ownerAffiliations: OWNER, orderBy: { direction: DESC, field: STARGAZERS }) {
      totalCount
      nodes {
        stargazers {
          totalCount
        }
      }
    }
  }
}
"#;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ProfileData>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileData {
    rate_limit: Option<RateLimit>,
    repository: Option<ProfileRepository>,
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateLimit {
    limit: i64,
    cost: i64,
    remaining: i64,
    reset_at: String,
}

#[derive(Debug, Deserialize)]
struct ProfileRepository {
    object: Option<Blob>,
}

#[derive(Debug, Deserialize)]
struct Blob {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    bio: Option<String>,
    login: String,
    location: Option<String>,
    repos_langs: Connection<LanguageRepository>,
    repos_stars: Connection<StarredRepository>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    nodes: Option<Vec<Option<T>>>,
}

impl<T> Connection<T> {
    fn into_nodes(self) -> impl Iterator<Item = T> {
        self.nodes.unwrap_or_default().into_iter().flatten()
    }
}

#[derive(Debug, Deserialize)]
struct LanguageRepository {
    languages: Option<LanguageConnection>,
}

#[derive(Debug, Deserialize)]
struct LanguageConnection {
    edges: Option<Vec<Option<LanguageEdge>>>,
}

#[derive(Debug, Deserialize)]
struct LanguageEdge {
    size: u64,
    node: LanguageNode,
}

#[derive(Debug, Deserialize)]
struct LanguageNode {
    name: String,
}

#[derive(Debug, Deserialize)]
struct StarredRepository {
    stargazers: Stargazers,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stargazers {
    total_count: u64,
}

impl User {
    fn into_raw(self, readme: Option<String>) -> RawProfile {
        let stargazer_counts = self
            .repos_stars
            .into_nodes()
            .map(|repo| repo.stargazers.total_count)
            .collect();

        let repository_languages = self
            .repos_langs
            .into_nodes()
            .map(|repo| {
                repo.languages
                    .and_then(|l| l.edges)
                    .unwrap_or_default()
                    .into_iter()
                    .flatten()
                    .map(|edge| LanguageSize::new(edge.node.name, edge.size))
                    .collect()
            })
            .collect();

        RawProfile {
            login: self.login,
            bio: self.bio,
            location: self.location,
            readme,
            stargazer_counts,
            repository_languages,
        }
    }
}

// ============================================================================
// Fetcher
// ============================================================================

fn map_reqwest_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::UpstreamFetch(format!("GitHub API timed out: {}", err))
    } else if err.is_decode() {
        AppError::UpstreamFetch(format!("Malformed GitHub API response: {}", err))
    } else {
        AppError::UpstreamFetch(format!("GitHub API request failed: {}", err))
    }
}

/// GithubInfoFetcher backed by the GitHub GraphQL API
pub struct GithubGraphqlFetcher {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl GithubGraphqlFetcher {
    /// # Errors
    /// - AppError::Configuration if `token` is empty
    pub fn new(
        token: &str,
        endpoint: impl Into<String>,
        http: &UpstreamHttpConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(http)?,
            endpoint: endpoint.into(),
            token: require_secret("GITHUB_PA_TOKEN", token)?,
        })
    }
}

#[async_trait]
impl GithubInfoFetcher for GithubGraphqlFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, username: &str) -> Result<ProfileQueryResult> {
        if username.trim().is_empty() {
            return Err(AppError::MalformedInput(
                "username must not be empty".to_string(),
            ));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("token {}", self.token))
            .json(&json!({
                "query": PROFILE_QUERY,
                "variables": { "login": username },
            }))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "GitHub API error");
            return Err(AppError::UpstreamFetch(format!(
                "GitHub API returned {}: {}",
                status, body
            )));
        }

        let body: GraphqlResponse = response.json().await.map_err(map_reqwest_error)?;
        let messages: Vec<String> = body
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.message)
            .collect();

        let data = body.data.ok_or_else(|| {
            AppError::UpstreamFetch(format!("GitHub API returned no data: {}", messages.join("; ")))
        })?;

        if let Some(rate) = &data.rate_limit {
            debug!(
                limit = rate.limit,
                cost = rate.cost,
                remaining = rate.remaining,
                reset_at = %rate.reset_at,
                "GitHub rate limit"
            );
        }

        let user = data.user.ok_or_else(|| {
            AppError::UpstreamFetch(format!(
                "user {} not found: {}",
                username,
                messages.join("; ")
            ))
        })?;

        // A missing profile repository is reported as a GraphQL error; the
        // README simply stays empty in that case.
        if !messages.is_empty() {
            debug!(errors = ?messages, "Ignoring partial GraphQL errors");
        }

        let readme = data
            .repository
            .and_then(|r| r.object)
            .and_then(|o| o.text);

        Ok(ProfileQueryResult::from_raw(user.into_raw(readme)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::Value;

    fn fetcher(server: &MockServer) -> GithubGraphqlFetcher {
        GithubGraphqlFetcher::new(
            "ghp_test",
            server.url("/graphql"),
            &UpstreamHttpConfig::default(),
        )
        .unwrap()
    }

    fn user_payload(readme: Value) -> Value {
        json!({
            "data": {
                "rateLimit": { "limit": 5000, "cost": 1, "remaining": 4999, "resetAt": "2026-01-01T00:00:00Z" },
                "repository": readme,
                "user": {
                    "bio": "Mascot",
                    "login": "octocat",
                    "location": "San Francisco",
                    "reposLangs": { "nodes": [
                        { "name": "a", "languages": { "edges": [
                            { "size": 100, "node": { "name": "Rust" } },
                            { "size": 10, "node": { "name": "Shell" } }
                        ] } },
                        { "name": "b", "languages": { "edges": [
                            { "size": 50, "node": { "name": "Rust" } }
                        ] } }
                    ] },
                    "reposStars": { "totalCount": 2, "nodes": [
                        { "stargazers": { "totalCount": 40 } },
                        { "stargazers": { "totalCount": 2 } }
                    ] }
                }
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_aggregates_profile() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/graphql")
                    .header("Authorization", "token ghp_test")
                    .json_body_partial(r#"{"variables": {"login": "octocat"}}"#);
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(user_payload(json!({ "object": { "text": "# Hi" } })));
            })
            .await;

        let profile = fetcher(&server).fetch("octocat").await.unwrap();

        mock.assert_async().await;
        assert_eq!(profile.username, "octocat");
        assert_eq!(profile.total_stars, 42);
        assert_eq!(profile.language_bytes.get("Rust"), Some(150));
        assert_eq!(profile.language_bytes.get("Shell"), Some(10));
        assert_eq!(profile.language_bytes.total(), 160);
        assert_eq!(profile.readme_text, "# Hi");
        assert_eq!(profile.bio, "Mascot");
    }

    #[tokio::test]
    async fn test_missing_profile_repository_yields_empty_readme() {
        let server = MockServer::start_async().await;
        let mut payload = user_payload(Value::Null);
        payload["errors"] = json!([{
            "type": "NOT_FOUND",
            "message": "Could not resolve to a Repository with the name 'octocat/octocat'."
        }]);
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200).json_body(payload);
            })
            .await;

        let profile = fetcher(&server).fetch("octocat").await.unwrap();
        assert_eq!(profile.readme_text, "");
        assert_eq!(profile.total_stars, 42);
    }

    #[tokio::test]
    async fn test_readme_missing_on_branch_yields_empty_readme() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200)
                    .json_body(user_payload(json!({ "object": null })));
            })
            .await;

        let profile = fetcher(&server).fetch("octocat").await.unwrap();
        assert_eq!(profile.readme_text, "");
    }

    #[tokio::test]
    async fn test_unknown_user_is_upstream_fetch_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200).json_body(json!({
                    "data": { "rateLimit": null, "repository": null, "user": null },
                    "errors": [{ "message": "Could not resolve to a User with the login of 'nobody'." }]
                }));
            })
            .await;

        let err = fetcher(&server).fetch("nobody").await.unwrap_err();
        match err {
            AppError::UpstreamFetch(msg) => {
                assert!(msg.contains("nobody"));
                assert!(msg.contains("Could not resolve to a User"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_user_without_repositories() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200).json_body(json!({
                    "data": {
                        "repository": null,
                        "user": {
                            "bio": null,
                            "login": "ghost",
                            "location": null,
                            "reposLangs": { "nodes": [] },
                            "reposStars": { "totalCount": 0, "nodes": [] }
                        }
                    }
                }));
            })
            .await;

        let profile = fetcher(&server).fetch("ghost").await.unwrap();
        assert_eq!(profile.total_stars, 0);
        assert_eq!(profile.language_bytes.languages().count(), 0);
        assert_eq!(profile.language_bytes.total(), 0);
        assert_eq!(profile.bio, "");
        assert_eq!(profile.location, "");
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(403).body("API rate limit exceeded");
            })
            .await;

        let err = fetcher(&server).fetch("octocat").await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamFetch(ref m) if m.contains("403")));
    }

    #[tokio::test]
    async fn test_empty_username_is_rejected_without_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200);
            })
            .await;

        let err = fetcher(&server).fetch("  ").await.unwrap_err();
        assert!(matches!(err, AppError::MalformedInput(_)));
        mock.assert_hits_async(0).await;
    }

    #[test]
    fn test_missing_token_is_configuration_error() {
        let result = GithubGraphqlFetcher::new(
            "",
            DEFAULT_GITHUB_GRAPHQL_URL,
            &UpstreamHttpConfig::default(),
        );
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
