//! Background-execution facility port.

use crate::scheduler::domain::BackgroundTaskId;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for facility operations.
pub type FacilityResult<T> = Result<T, FacilityError>;

/// Callback the host invokes on every wake-up.
#[async_trait]
pub trait WakeHandler: Send + Sync {
    /// Runs the work for one wake-up.
    async fn on_wake(&self);
}

/// Host service that invokes a handler periodically, even when the
/// application is not in the foreground.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackgroundExecutionFacility: Send + Sync {
    /// Registers `handler` to run no more often than every `min_interval`.
    ///
    /// Registering an existing task replaces it.
    async fn register(
        &self,
        task_id: &BackgroundTaskId,
        min_interval: Duration,
        handler: Arc<dyn WakeHandler>,
    ) -> FacilityResult<()>;

    /// Removes a task, returning whether it existed.
    async fn unregister(&self, task_id: &BackgroundTaskId) -> FacilityResult<bool>;

    /// Returns the minimum interval the host holds the task with, or `None`
    /// when it holds no such task.
    async fn registered_interval(
        &self,
        task_id: &BackgroundTaskId,
    ) -> FacilityResult<Option<Duration>>;
}

/// Errors returned by background-execution facilities.
#[derive(Debug, Clone, Error)]
pub enum FacilityError {
    /// The host refused the request.
    #[error("background facility rejected the request: {0}")]
    Rejected(String),

    /// The host could not be reached.
    #[error("background facility unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl FacilityError {
    /// Wraps a failure to reach the host.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
