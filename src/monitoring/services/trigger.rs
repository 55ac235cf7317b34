//! Single-flight entry point for monitoring passes.

use crate::monitoring::domain::PassSummary;
use crate::scheduler::ports::WakeHandler;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use super::orchestrator::PassResult;

/// Something that can run a cancellable monitoring pass.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PassRunner: Send + Sync {
    /// Runs one pass, stopping early when `cancel` resolves.
    async fn run_until(&self, cancel: BoxFuture<'static, ()>) -> PassResult<PassSummary>;
}

/// Ensures at most one pass runs at a time.
///
/// Scheduled wake-ups and manual triggers both go through the same gate. A
/// request that arrives while a pass is running is skipped, not queued.
pub struct PassTrigger<P>
where
    P: PassRunner,
{
    runner: Arc<P>,
    gate: Mutex<()>,
    shutdown: watch::Sender<bool>,
    skipped: AtomicU64,
}

impl<P> PassTrigger<P>
where
    P: PassRunner,
{
    /// Creates a trigger around a pass runner.
    #[must_use]
    pub fn new(runner: Arc<P>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            runner,
            gate: Mutex::new(()),
            shutdown,
            skipped: AtomicU64::new(0),
        }
    }

    /// Runs a pass now unless one is already running.
    ///
    /// Returns `None` when the request was skipped.
    pub async fn run_now(&self) -> Option<PassResult<PassSummary>> {
        let Ok(_running) = self.gate.try_lock() else {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            debug!("monitoring pass already running; request skipped");
            return None;
        };
        if self.is_shutting_down() {
            debug!("shutdown requested; pass not started");
            return None;
        }
        Some(self.runner.run_until(self.cancel_signal()).await)
    }

    /// Asks the running pass, and any later one, to stop.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Returns whether shutdown was requested.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Waits until no pass is running.
    pub async fn wait_idle(&self) {
        drop(self.gate.lock().await);
    }

    /// Returns how many requests were skipped because a pass was running.
    #[must_use]
    pub fn skipped_requests(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    fn cancel_signal(&self) -> BoxFuture<'static, ()> {
        let mut receiver = self.shutdown.subscribe();
        async move {
            if receiver.wait_for(|stop| *stop).await.is_err() {
                std::future::pending::<()>().await;
            }
        }
        .boxed()
    }
}

#[async_trait]
impl<P> WakeHandler for PassTrigger<P>
where
    P: PassRunner,
{
    async fn on_wake(&self) {
        match self.run_now().await {
            Some(Ok(_)) | None => {}
            Some(Err(err)) => warn!(error = %err, "scheduled monitoring pass failed"),
        }
    }
}
