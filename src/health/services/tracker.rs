//! Transition detection over persisted health state.

use crate::health::{
    domain::{HealthCheckResult, ServerHealthState, TransitionEvent},
    ports::{HealthStateRepository, HealthStateRepositoryError},
};
use crate::inventory::domain::ServerId;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for health tracking.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] HealthStateRepositoryError),
}

/// Result type for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Owns the last-known status of every server and reports changes.
///
/// Callers must not apply results for the same server concurrently; the
/// monitoring pass guarantees one probe per server at a time.
#[derive(Clone)]
pub struct ServerStateTracker<R>
where
    R: HealthStateRepository,
{
    repository: Arc<R>,
}

impl<R> ServerStateTracker<R>
where
    R: HealthStateRepository,
{
    /// Creates a tracker over a repository.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Folds a probe result into the server's state and persists it.
    ///
    /// A server without a record starts from
    /// [`ServerHealthState::initial`], whose `Unknown` status counts as the
    /// prior status. The state is saved before this returns, so a returned
    /// transition is never lost to a crash.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Repository`] when the record cannot be loaded
    /// or saved. Nothing is emitted in that case.
    pub async fn apply_result(
        &self,
        server_id: ServerId,
        result: &HealthCheckResult,
    ) -> TrackerResult<Option<TransitionEvent>> {
        let mut state = self
            .repository
            .find(server_id)
            .await?
            .unwrap_or_else(|| ServerHealthState::initial(server_id));
        let transition = state.apply(result);
        self.repository.save(&state).await?;

        match &transition {
            Some(event) => info!(
                server_id = %server_id,
                from = %event.from,
                to = %event.to,
                "server status changed"
            ),
            None => debug!(
                server_id = %server_id,
                status = %state.current_status(),
                consecutive_failures = state.consecutive_failures(),
                "server status unchanged"
            ),
        }
        Ok(transition)
    }

    /// Returns the stored state for a server.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Repository`] when the lookup fails.
    pub async fn current(&self, server_id: ServerId) -> TrackerResult<Option<ServerHealthState>> {
        Ok(self.repository.find(server_id).await?)
    }

    /// Returns every stored state.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Repository`] when the listing fails.
    pub async fn all(&self) -> TrackerResult<Vec<ServerHealthState>> {
        Ok(self.repository.list_all().await?)
    }

    /// Deletes the record of a removed server.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Repository`] when the deletion fails.
    pub async fn forget(&self, server_id: ServerId) -> TrackerResult<bool> {
        Ok(self.repository.delete(server_id).await?)
    }

    /// Deletes every record.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Repository`] when the deletion fails.
    pub async fn clear_all(&self) -> TrackerResult<()> {
        Ok(self.repository.clear().await?)
    }
}
