//! Notification dispatcher port.

use crate::monitoring::domain::AlertRequest;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for dispatcher operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Delivers alert requests to the user.
///
/// Delivery is best effort; callers bound every request with their own
/// timeout.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Requests one alert.
    async fn request_alert(&self, alert: &AlertRequest) -> DispatchResult<()>;
}

/// Errors returned by dispatchers.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// Alerts are blocked, for example by a missing permission.
    #[error("alert delivery refused: {0}")]
    Refused(String),

    /// The delivery channel failed.
    #[error("alert delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl DispatchError {
    /// Wraps a delivery channel failure.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
