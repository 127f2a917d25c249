//! Shared wiring for end-to-end tests: in-memory job table, mock upstreams

#![allow(dead_code)]

use ghprofile_api::{ApiHandler, RateLimiter};
use ghprofile_core::application::{
    shutdown_channel, ProfileGenerationJob, ProfileJobService, PromptComposer, RunningJobs,
    ShutdownSender, WorkerPool,
};
use ghprofile_core::domain::{GenerationJob, JobState};
use ghprofile_core::port::completion::mocks::MockCompletionClient;
use ghprofile_core::port::github::mocks::MockGithubFetcher;
use ghprofile_core::port::id_provider::UuidProvider;
use ghprofile_core::port::time_provider::SystemTimeProvider;
use ghprofile_core::port::{CompletionClient, GithubInfoFetcher, JobRepository};
use ghprofile_infra_memory::InMemoryJobRepository;
use std::sync::Arc;
use std::time::Duration;

pub struct Stack {
    pub repo: Arc<InMemoryJobRepository>,
    pub service: Arc<ProfileJobService>,
    pub handler: Arc<ApiHandler>,
    pub running: Arc<RunningJobs>,
    pub pool: WorkerPool,
    pub shutdown: ShutdownSender,
}

impl Stack {
    pub fn start(
        workers: usize,
        fetcher: Arc<dyn GithubInfoFetcher>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self::start_with_limiter(workers, fetcher, completion, RateLimiter::default())
    }

    pub fn start_with_limiter(
        workers: usize,
        fetcher: Arc<dyn GithubInfoFetcher>,
        completion: Arc<dyn CompletionClient>,
        limiter: RateLimiter,
    ) -> Self {
        let repo = Arc::new(InMemoryJobRepository::new());
        let job_repo: Arc<dyn JobRepository> = repo.clone();
        let time = Arc::new(SystemTimeProvider);
        let pipeline = Arc::new(ProfileGenerationJob::new(
            fetcher,
            PromptComposer::default(),
            completion,
        ));
        let running = Arc::new(RunningJobs::new());
        let service = Arc::new(
            ProfileJobService::new(job_repo.clone(), Arc::new(UuidProvider), time.clone())
                .with_running_jobs(running.clone()),
        );
        let handler = Arc::new(ApiHandler::new(service.clone(), Arc::new(limiter)));

        let (shutdown, token) = shutdown_channel();
        let pool = WorkerPool::spawn(workers, job_repo, pipeline, time, running.clone(), token);

        Self {
            repo,
            service,
            handler,
            running,
            pool,
            shutdown,
        }
    }

    /// Default stack: successful fetch, completion answering `text`
    pub fn with_text(text: &str) -> (Self, Arc<MockCompletionClient>) {
        let completion = Arc::new(MockCompletionClient::new_success(text));
        let stack = Self::start(
            2,
            Arc::new(MockGithubFetcher::new_success()),
            completion.clone(),
        );
        (stack, completion)
    }

    /// Poll the job table until `id` reaches a final state
    pub async fn wait_final(&self, id: &str) -> GenerationJob {
        let id = id.to_string();
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let job = self.service.status(&id).await.unwrap();
                if job.state.is_final() {
                    return job;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("job did not finish in time")
    }

    pub async fn wait_state(&self, id: &str, state: JobState) {
        let id = id.to_string();
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.service.status(&id).await.unwrap().state != state {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("job never reached the expected state");
    }

    pub async fn stop(self) {
        self.shutdown.shutdown();
        self.pool.join(Duration::from_secs(2)).await;
    }
}
