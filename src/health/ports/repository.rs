//! Repository port for per-server health state.

use crate::health::domain::ServerHealthState;
use crate::inventory::domain::ServerId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for health state repository operations.
pub type HealthStateResult<T> = Result<T, HealthStateRepositoryError>;

/// Durable storage for [`ServerHealthState`] records, keyed by server.
///
/// A completed `save` must survive process termination.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthStateRepository: Send + Sync {
    /// Loads the record for a server.
    async fn find(&self, server_id: ServerId) -> HealthStateResult<Option<ServerHealthState>>;

    /// Inserts or replaces a record.
    async fn save(&self, state: &ServerHealthState) -> HealthStateResult<()>;

    /// Deletes a record, returning whether it existed.
    async fn delete(&self, server_id: ServerId) -> HealthStateResult<bool>;

    /// Deletes every record.
    async fn clear(&self) -> HealthStateResult<()>;

    /// Returns every record ordered by server identifier.
    async fn list_all(&self) -> HealthStateResult<Vec<ServerHealthState>>;
}

/// Errors returned by health state repositories.
#[derive(Debug, Clone, Error)]
pub enum HealthStateRepositoryError {
    /// A stored record could not be decoded.
    #[error("invalid persisted health state: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Storage-layer failure.
    #[error("health state persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl HealthStateRepositoryError {
    /// Wraps decoding failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a storage-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
