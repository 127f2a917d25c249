//! GitHub profile generator daemon - composition root

mod settings;
mod telemetry;

use anyhow::{Context, Result};
use settings::Settings;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ghprofile_api::server::DEFAULT_RPC_HOST;
use ghprofile_api::{
    ApiHandler, RateLimiter, RestServer, RestServerConfig, RpcServer, RpcServerConfig,
};
use ghprofile_core::application::worker::constants::SHUTDOWN_GRACE_PERIOD;
use ghprofile_core::application::{
    shutdown_channel, ProfileGenerationJob, ProfileJobService, PromptComposer, RunningJobs,
    WorkerPool,
};
use ghprofile_core::port::id_provider::UuidProvider;
use ghprofile_core::port::time_provider::SystemTimeProvider;
use ghprofile_core::port::{CompletionClient, GithubInfoFetcher, JobRepository};
use ghprofile_infra_memory::InMemoryJobRepository;
use ghprofile_infra_upstream::{GithubGraphqlFetcher, OpenAiCompletionClient, UpstreamHttpConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "ghprofile=info";

fn init_logging() -> Result<()> {
    let log_format =
        std::env::var("GHPROFILE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    let otel = telemetry::layer().context("Failed to initialize OpenTelemetry")?;
    let registry = tracing_subscriber::registry().with(otel).with(env_filter);

    match log_format.as_str() {
        // Production: JSON structured logging
        "json" => registry.with(fmt::layer().json()).try_init()?,
        _ => registry.with(fmt::layer().pretty()).try_init()?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    info!("ghprofile daemon v{} starting...", VERSION);

    // 1. Configuration (fails fast on missing credentials)
    let settings = Settings::load().context("Failed to load configuration")?;
    settings.validate()?;

    // 2. Upstream adapters
    let http = UpstreamHttpConfig {
        timeout: settings.upstream_timeout(),
    };
    let fetcher: Arc<dyn GithubInfoFetcher> = Arc::new(GithubGraphqlFetcher::new(
        &settings.github_pa_token,
        settings.github_api_url.clone(),
        &http,
    )?);
    let completion: Arc<dyn CompletionClient> = Arc::new(OpenAiCompletionClient::new(
        &settings.openai_api_key,
        &settings.openai_api_url,
        settings.completion_model.clone(),
        &http,
    )?);
    info!(model = %settings.completion_model, "Upstream clients ready");

    // 3. Job table and use cases
    let time_provider = Arc::new(SystemTimeProvider);
    let job_repo: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::with_retention(
        settings.retention(),
    ));
    let pipeline = Arc::new(ProfileGenerationJob::new(
        fetcher,
        PromptComposer::default(),
        completion,
    ));
    let running = Arc::new(RunningJobs::new());
    let service = Arc::new(
        ProfileJobService::new(job_repo.clone(), Arc::new(UuidProvider), time_provider.clone())
            .with_running_jobs(running.clone()),
    );
    let rate_limiter = Arc::new(RateLimiter::new(
        settings.rate_limit_burst,
        settings.rate_limit_rate,
    ));
    let handler = Arc::new(ApiHandler::new(service, rate_limiter));

    // 4. Workers
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let pool = WorkerPool::spawn(
        settings.max_concurrency,
        job_repo,
        pipeline,
        time_provider,
        running,
        shutdown_rx.clone(),
    );

    // 5. Servers
    let rpc_config = RpcServerConfig {
        host: DEFAULT_RPC_HOST.to_string(),
        port: settings.rpc_port,
    };
    let (_, rpc_handle) = RpcServer::new(rpc_config, handler.clone())
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    let rest_config = RestServerConfig {
        host: settings.http_host.clone(),
        port: settings.http_port,
    };
    let (_, rest_handle) = RestServer::new(rest_config, handler)
        .start(shutdown_rx)
        .await
        .map_err(|e| anyhow::anyhow!("REST server start failed: {}", e))?;

    info!(workers = pool.size(), "System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    shutdown_tx.shutdown();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    let _ = tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, rest_handle).await;
    pool.join(SHUTDOWN_GRACE_PERIOD).await;
    telemetry::shutdown();

    info!("Shutdown complete.");
    Ok(())
}
