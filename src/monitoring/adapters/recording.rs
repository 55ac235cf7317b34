//! Dispatcher that records alerts in memory.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::monitoring::{
    domain::AlertRequest,
    ports::{DispatchError, DispatchResult, NotificationDispatcher},
};

/// Thread-safe dispatcher keeping every alert it accepts.
///
/// It can be slowed down or told to refuse alerts so callers can exercise
/// their timeout and failure handling.
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    state: Arc<RwLock<RecordingState>>,
}

#[derive(Debug, Default)]
struct RecordingState {
    alerts: Vec<AlertRequest>,
    delay: Duration,
    refusing: bool,
}

fn lock_error(err: impl ToString) -> DispatchError {
    DispatchError::delivery(std::io::Error::other(err.to_string()))
}

impl RecordingDispatcher {
    /// Creates a dispatcher that accepts alerts immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the alerts accepted so far.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Delivery`] if the state lock is poisoned.
    pub fn alerts(&self) -> DispatchResult<Vec<AlertRequest>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.alerts.clone())
    }

    /// Delays every subsequent alert by `delay` before accepting it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Delivery`] if the state lock is poisoned.
    pub fn set_delay(&self, delay: Duration) -> DispatchResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.delay = delay;
        Ok(())
    }

    /// Makes subsequent alerts fail with [`DispatchError::Refused`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Delivery`] if the state lock is poisoned.
    pub fn set_refusing(&self, refusing: bool) -> DispatchResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.refusing = refusing;
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn request_alert(&self, alert: &AlertRequest) -> DispatchResult<()> {
        let (delay, refusing) = {
            let state = self.state.read().map_err(lock_error)?;
            (state.delay, state.refusing)
        };
        if refusing {
            return Err(DispatchError::Refused("notifications are blocked".to_owned()));
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.write().map_err(lock_error)?;
        state.alerts.push(alert.clone());
        Ok(())
    }
}
