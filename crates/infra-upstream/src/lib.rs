// GhProfile Infrastructure - Upstream HTTP Adapters
// Implements: GithubInfoFetcher (GraphQL), CompletionClient (text completions)

mod http;
mod github;
mod openai;

pub use github::{GithubGraphqlFetcher, DEFAULT_GITHUB_GRAPHQL_URL};
pub use http::UpstreamHttpConfig;
pub use openai::{OpenAiCompletionClient, DEFAULT_COMPLETION_MODEL, DEFAULT_OPENAI_BASE_URL};

// Note: reqwest::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<reqwest::Error> for AppError here)
