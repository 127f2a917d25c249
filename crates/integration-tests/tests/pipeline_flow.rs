//! End-to-end job lifecycle over the in-memory job table and worker pool

mod common;

use async_trait::async_trait;
use common::Stack;
use ghprofile_core::application::profile_job::SubmitRequest;
use ghprofile_core::domain::{JobState, Mod, ModSet};
use ghprofile_core::error::{AppError, Result};
use ghprofile_core::port::completion::mocks::MockCompletionClient;
use ghprofile_core::port::github::mocks::MockGithubFetcher;
use ghprofile_core::port::CompletionClient;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_submit_returns_before_generation_completes() {
    let completion = Arc::new(
        MockCompletionClient::new_success("# Hi").with_delay(Duration::from_millis(300)),
    );
    let stack = Stack::start(1, Arc::new(MockGithubFetcher::new_success()), completion);

    let id = stack
        .service
        .submit(SubmitRequest::new("octocat", ModSet::default()))
        .await
        .unwrap();
    assert!(!id.is_empty());

    let job = stack.service.status(&id).await.unwrap();
    assert!(
        !job.state.is_final(),
        "Submission must not wait for the pipeline"
    );
    assert!(job.result.is_none());

    let job = stack.wait_final(&id).await;
    assert_eq!(job.state, JobState::Succeeded);
    stack.stop().await;
}

#[tokio::test]
async fn test_result_is_stored_verbatim() {
    let text = "\n\n## Hey there 👋\nI build things in Rust.  ";
    let (stack, completion) = Stack::with_text(text);

    let mods: ModSet = [Mod::Yoda].into_iter().collect();
    let id = stack
        .service
        .submit(SubmitRequest::new("octocat", mods))
        .await
        .unwrap();

    let job = stack.wait_final(&id).await;
    assert_eq!(job.state, JobState::Succeeded);
    assert_eq!(job.result.as_deref(), Some(text));
    assert!(job.error.is_none());

    let prompts = completion.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("I Have 42 Github stars"));
    assert!(prompts[0].contains(Mod::Yoda.prompt_fragment()));
    stack.stop().await;
}

#[tokio::test]
async fn test_fetch_failure_marks_job_failed() {
    let completion = Arc::new(MockCompletionClient::new_success("unused"));
    let stack = Stack::start(
        1,
        Arc::new(MockGithubFetcher::new_fail("user nobody not found")),
        completion.clone(),
    );

    let id = stack
        .service
        .submit(SubmitRequest::new("nobody", ModSet::default()))
        .await
        .unwrap();

    let job = stack.wait_final(&id).await;
    assert_eq!(job.state, JobState::Failed);
    assert!(job.error.unwrap().contains("user nobody not found"));
    assert!(job.result.is_none());
    assert_eq!(completion.call_count(), 0, "No completion after a failed fetch");
    stack.stop().await;
}

#[tokio::test]
async fn test_cancel_while_running_stays_cancelled() {
    let completion = Arc::new(
        MockCompletionClient::new_success("late text").with_delay(Duration::from_millis(200)),
    );
    let stack = Stack::start(1, Arc::new(MockGithubFetcher::new_success()), completion.clone());

    let id = stack
        .service
        .submit(SubmitRequest::new("octocat", ModSet::default()))
        .await
        .unwrap();
    stack.wait_state(&id, JobState::Started).await;

    let cancelled = stack.service.cancel(&id).await.unwrap();
    assert_eq!(cancelled.state, JobState::Cancelled);

    // Past the point where the pipeline would have recorded its outcome
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(completion.call_count(), 1);

    let job = stack.service.status(&id).await.unwrap();
    assert_eq!(job.state, JobState::Cancelled);
    assert!(job.result.is_none(), "Late result must be discarded");
    stack.stop().await;
}

/// Never answers its first call; answers `text` afterwards
struct HangOnceCompletion {
    calls: AtomicUsize,
    dropped: Arc<AtomicBool>,
}

struct SetOnDrop(Arc<AtomicBool>);

impl Drop for SetOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CompletionClient for HangOnceCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            let _guard = SetOnDrop(self.dropped.clone());
            std::future::pending::<()>().await;
        }
        Ok("second".to_string())
    }
}

#[tokio::test]
async fn test_cancel_aborts_running_pipeline_and_frees_worker() {
    let dropped = Arc::new(AtomicBool::new(false));
    let completion = Arc::new(HangOnceCompletion {
        calls: AtomicUsize::new(0),
        dropped: dropped.clone(),
    });
    let stack = Stack::start(
        1,
        Arc::new(MockGithubFetcher::new_success()),
        completion.clone(),
    );

    let stuck = stack
        .service
        .submit(SubmitRequest::new("octocat", ModSet::default()))
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(5), async {
        while completion.calls.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("pipeline never reached the completion call");
    stack.service.cancel(&stuck).await.unwrap();

    // The only worker is free again once the stuck pipeline is aborted
    let next = stack
        .service
        .submit(SubmitRequest::new("octocat", ModSet::default()))
        .await
        .unwrap();
    let job = stack.wait_final(&next).await;
    assert_eq!(job.state, JobState::Succeeded);
    assert_eq!(job.result.as_deref(), Some("second"));

    assert!(dropped.load(Ordering::SeqCst), "Stuck call should be dropped");
    assert_eq!(stack.service.status(&stuck).await.unwrap().state, JobState::Cancelled);
    tokio::time::timeout(Duration::from_secs(1), async {
        while !stack.running.is_empty().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("finished jobs should leave the running registry");
    stack.stop().await;
}

#[tokio::test]
async fn test_cancel_finished_job_is_conflict() {
    let (stack, _) = Stack::with_text("done");
    let id = stack
        .service
        .submit(SubmitRequest::new("octocat", ModSet::default()))
        .await
        .unwrap();
    stack.wait_final(&id).await;

    let err = stack.service.cancel(&id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    stack.stop().await;
}

#[tokio::test]
async fn test_pool_caps_concurrent_pipelines() {
    let completion = Arc::new(
        MockCompletionClient::new_success("ok").with_delay(Duration::from_millis(50)),
    );
    let stack = Stack::start(3, Arc::new(MockGithubFetcher::new_success()), completion.clone());

    let mut ids = Vec::new();
    for i in 0..12 {
        ids.push(
            stack
                .service
                .submit(SubmitRequest::new(format!("user-{}", i), ModSet::default()))
                .await
                .unwrap(),
        );
    }
    for id in &ids {
        assert_eq!(stack.wait_final(id).await.state, JobState::Succeeded);
    }

    assert_eq!(completion.call_count(), 12);
    assert!(completion.max_in_flight() <= 3, "At most 3 pipelines at once");
    assert!(completion.max_in_flight() >= 2, "Pool should run jobs in parallel");
    stack.stop().await;
}

struct PanickingCompletion;

#[async_trait]
impl CompletionClient for PanickingCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        panic!("completion exploded");
    }
}

#[tokio::test]
async fn test_panicking_pipeline_fails_job_and_worker_survives() {
    let stack = Stack::start(
        1,
        Arc::new(MockGithubFetcher::new_success()),
        Arc::new(PanickingCompletion),
    );

    let first = stack
        .service
        .submit(SubmitRequest::new("octocat", ModSet::default()))
        .await
        .unwrap();
    let second = stack
        .service
        .submit(SubmitRequest::new("octocat", ModSet::default()))
        .await
        .unwrap();

    // The single worker must survive the first panic to reach the second job
    for id in [&first, &second] {
        let job = stack.wait_final(id).await;
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.error.as_deref(), Some("generation task panicked"));
    }
    stack.stop().await;
}

#[tokio::test]
async fn test_empty_username_is_rejected_at_submit() {
    let (stack, _) = Stack::with_text("unused");
    let err = stack
        .service
        .submit(SubmitRequest::new("  ", ModSet::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MalformedInput(_)));
    assert!(stack.repo.is_empty().await);
    stack.stop().await;
}
