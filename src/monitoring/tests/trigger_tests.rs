//! Single-flight behaviour of the pass trigger.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::inventory::ports::ConfigStoreError;
use crate::monitoring::{
    domain::PassSummary,
    services::{MockPassRunner, PassError, PassResult, PassRunner, PassTrigger},
};
use crate::scheduler::ports::WakeHandler;
use async_trait::async_trait;
use chrono::Utc;
use futures::future::BoxFuture;
use rstest::rstest;

/// Runner whose passes last until they are cancelled.
#[derive(Default)]
struct BlockingRunner {
    started: AtomicUsize,
}

#[async_trait]
impl PassRunner for BlockingRunner {
    async fn run_until(&self, cancel: BoxFuture<'static, ()>) -> PassResult<PassSummary> {
        self.started.fetch_add(1, Ordering::SeqCst);
        cancel.await;
        let mut summary = PassSummary::started(Utc::now());
        summary.cancelled = true;
        Ok(summary)
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn requests_during_a_running_pass_are_skipped() {
    let runner = Arc::new(BlockingRunner::default());
    let trigger = Arc::new(PassTrigger::new(Arc::clone(&runner)));
    let background = Arc::clone(&trigger);
    let running = tokio::spawn(async move { background.run_now().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = trigger.run_now().await;
    trigger.on_wake().await;

    assert!(second.is_none());
    assert_eq!(trigger.skipped_requests(), 2);
    assert_eq!(runner.started.load(Ordering::SeqCst), 1);

    trigger.shutdown();
    let first = running
        .await
        .expect("pass task should join")
        .expect("first request ran")
        .expect("pass should succeed");
    assert!(first.cancelled);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn no_pass_starts_after_shutdown() {
    let runner = Arc::new(BlockingRunner::default());
    let trigger = PassTrigger::new(Arc::clone(&runner));
    trigger.shutdown();

    let outcome = trigger.run_now().await;

    assert!(outcome.is_none());
    assert!(trigger.is_shutting_down());
    assert_eq!(runner.started.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn wait_idle_returns_once_the_pass_finishes() {
    let trigger = Arc::new(PassTrigger::new(Arc::new(BlockingRunner::default())));
    let background = Arc::clone(&trigger);
    let running = tokio::spawn(async move { background.run_now().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    trigger.shutdown();
    tokio::time::timeout(Duration::from_secs(2), trigger.wait_idle())
        .await
        .expect("pass should stop after shutdown");

    running.await.expect("pass task should join");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn each_wake_runs_one_pass() {
    let mut runner = MockPassRunner::new();
    runner
        .expect_run_until()
        .times(2)
        .returning(|_| Ok(PassSummary::started(Utc::now())));
    let trigger = PassTrigger::new(Arc::new(runner));

    trigger.on_wake().await;
    trigger.on_wake().await;

    assert_eq!(trigger.skipped_requests(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_scheduled_pass_does_not_poison_the_trigger() {
    let mut runner = MockPassRunner::new();
    runner.expect_run_until().times(2).returning(|_| {
        Err(PassError::ConfigRead(ConfigStoreError::persistence(
            std::io::Error::other("settings unreadable"),
        )))
    });
    let trigger = PassTrigger::new(Arc::new(runner));

    trigger.on_wake().await;
    let outcome = trigger.run_now().await;

    assert!(matches!(outcome, Some(Err(PassError::ConfigRead(_)))));
}
