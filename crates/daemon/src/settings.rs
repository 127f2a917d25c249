//! Daemon configuration
//!
//! Layered lowest to highest: built-in defaults, optional TOML file,
//! `GHPROFILE_*` variables, then the bare credential variables
//! `GITHUB_PA_TOKEN` and `OPENAI_API_KEY`.

use config::{Config, Environment, File, FileFormat};
use ghprofile_core::error::AppError;
use ghprofile_infra_memory::{RetentionPolicy, DEFAULT_MAX_FINISHED, DEFAULT_RETENTION};
use ghprofile_infra_upstream::{
    DEFAULT_COMPLETION_MODEL, DEFAULT_GITHUB_GRAPHQL_URL, DEFAULT_OPENAI_BASE_URL,
};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "~/.ghprofile/config.toml";
pub const ENV_PREFIX: &str = "GHPROFILE";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub github_pa_token: String,
    #[serde(default)]
    pub openai_api_key: String,
    pub github_api_url: String,
    pub openai_api_url: String,
    pub completion_model: String,
    pub http_host: String,
    pub http_port: u16,
    pub rpc_port: u16,
    pub max_concurrency: usize,
    pub upstream_timeout_secs: Option<u64>,
    pub rate_limit_burst: u32,
    pub rate_limit_rate: u32,
    pub job_retention_secs: u64,
    pub max_finished_jobs: usize,
}

impl Settings {
    /// Load from the process environment and the configured file
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("GHPROFILE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let path = shellexpand::tilde(&path).into_owned();
        Self::load_with(Some(&path), ENV_PREFIX, |key| std::env::var(key).ok())
    }

    /// `lookup` resolves the bare credential variables
    pub fn load_with(
        config_path: Option<&str>,
        env_prefix: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("github_api_url", DEFAULT_GITHUB_GRAPHQL_URL)?
            .set_default("openai_api_url", DEFAULT_OPENAI_BASE_URL)?
            .set_default("completion_model", DEFAULT_COMPLETION_MODEL)?
            .set_default("http_host", "127.0.0.1")?
            .set_default("http_port", 8080)?
            .set_default("rpc_port", 9527)?
            .set_default("max_concurrency", 10)?
            .set_default("rate_limit_burst", 200)?
            .set_default("rate_limit_rate", 100)?
            .set_default("job_retention_secs", DEFAULT_RETENTION.as_secs())?
            .set_default("max_finished_jobs", DEFAULT_MAX_FINISHED as u64)?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::new(path, FileFormat::Toml).required(false));
        }

        builder = builder
            .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
            .set_override_option("github_pa_token", lookup("GITHUB_PA_TOKEN"))?
            .set_override_option("openai_api_key", lookup("OPENAI_API_KEY"))?;

        builder.build()?.try_deserialize()
    }

    /// Fail fast on anything the pipeline cannot run without
    pub fn validate(&self) -> Result<(), AppError> {
        if self.github_pa_token.trim().is_empty() {
            return Err(AppError::Configuration("GITHUB_PA_TOKEN is not set".into()));
        }
        if self.openai_api_key.trim().is_empty() {
            return Err(AppError::Configuration("OPENAI_API_KEY is not set".into()));
        }
        if self.max_concurrency == 0 {
            return Err(AppError::Configuration(
                "max_concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }

    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy {
            ttl: Duration::from_secs(self.job_retention_secs),
            max_finished: self.max_finished_jobs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn credentials() -> HashMap<&'static str, String> {
        HashMap::from([
            ("GITHUB_PA_TOKEN", "ghp_test".to_string()),
            ("OPENAI_API_KEY", "sk-test".to_string()),
        ])
    }

    #[test]
    fn test_defaults_with_credentials() {
        let env = credentials();
        let settings = tokio_test::assert_ok!(Settings::load_with(
            None,
            "GHPROFILE_TEST_DEFAULTS",
            |k| env.get(k).cloned()
        ));

        assert_eq!(settings.github_pa_token, "ghp_test");
        assert_eq!(settings.github_api_url, DEFAULT_GITHUB_GRAPHQL_URL);
        assert_eq!(settings.completion_model, DEFAULT_COMPLETION_MODEL);
        assert_eq!(settings.http_port, 8080);
        assert_eq!(settings.rpc_port, 9527);
        assert_eq!(settings.max_concurrency, 10);
        assert!(settings.upstream_timeout().is_none());
        assert_eq!(settings.retention().ttl, DEFAULT_RETENTION);
        assert_eq!(settings.retention().max_finished, DEFAULT_MAX_FINISHED);
        tokio_test::assert_ok!(settings.validate());
    }

    #[test]
    fn test_missing_credentials_fail_validation() {
        let settings =
            Settings::load_with(None, "GHPROFILE_TEST_MISSING", |_| None).unwrap();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, AppError::Configuration(ref m) if m.contains("GITHUB_PA_TOKEN")));

        let settings = Settings::load_with(None, "GHPROFILE_TEST_MISSING", |k| {
            (k == "GITHUB_PA_TOKEN").then(|| "ghp_test".to_string())
        })
        .unwrap();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, AppError::Configuration(ref m) if m.contains("OPENAI_API_KEY")));
    }

    #[test]
    fn test_file_values_and_credential_override() {
        let path = std::env::temp_dir().join(format!(
            "ghprofile-settings-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "github_pa_token = \"from-file\"\nhttp_port = 9090\nupstream_timeout_secs = 30\n\
             job_retention_secs = 120\nmax_finished_jobs = 50\n",
        )
        .unwrap();

        let env = credentials();
        let settings = Settings::load_with(
            Some(path.to_str().unwrap()),
            "GHPROFILE_TEST_FILE",
            |k| env.get(k).cloned(),
        )
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.http_port, 9090);
        assert_eq!(settings.upstream_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.retention().ttl, Duration::from_secs(120));
        assert_eq!(settings.retention().max_finished, 50);
        // Bare env credentials win over the file
        assert_eq!(settings.github_pa_token, "ghp_test");
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let settings = Settings::load_with(
            Some("/nonexistent/ghprofile/config.toml"),
            "GHPROFILE_TEST_NOFILE",
            |_| None,
        );
        assert!(settings.is_ok());
    }
}
