//! In-memory health state repository.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::health::{
    domain::ServerHealthState,
    ports::{HealthStateRepository, HealthStateRepositoryError, HealthStateResult},
};
use crate::inventory::domain::ServerId;

/// Thread-safe in-memory health state repository.
///
/// Counts successful saves and can be told to fail writes, so callers can
/// assert on persistence side effects.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHealthStateRepository {
    state: Arc<RwLock<InMemoryHealthState>>,
}

#[derive(Debug, Default)]
struct InMemoryHealthState {
    records: BTreeMap<ServerId, ServerHealthState>,
    write_count: usize,
    failing_writes: bool,
}

fn lock_error(err: impl ToString) -> HealthStateRepositoryError {
    HealthStateRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryHealthStateRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of successful saves.
    ///
    /// # Errors
    ///
    /// Returns [`HealthStateRepositoryError::Persistence`] if the state lock
    /// is poisoned.
    pub fn write_count(&self) -> HealthStateResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.write_count)
    }

    /// Makes subsequent saves fail.
    ///
    /// # Errors
    ///
    /// Returns [`HealthStateRepositoryError::Persistence`] if the state lock
    /// is poisoned.
    pub fn set_failing_writes(&self, failing: bool) -> HealthStateResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failing_writes = failing;
        Ok(())
    }
}

#[async_trait]
impl HealthStateRepository for InMemoryHealthStateRepository {
    async fn find(&self, server_id: ServerId) -> HealthStateResult<Option<ServerHealthState>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.records.get(&server_id).cloned())
    }

    async fn save(&self, record: &ServerHealthState) -> HealthStateResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.failing_writes {
            return Err(HealthStateRepositoryError::persistence(
                std::io::Error::other("health state writes are failing"),
            ));
        }
        state.records.insert(record.server_id(), record.clone());
        state.write_count += 1;
        Ok(())
    }

    async fn delete(&self, server_id: ServerId) -> HealthStateResult<bool> {
        let mut state = self.state.write().map_err(lock_error)?;
        Ok(state.records.remove(&server_id).is_some())
    }

    async fn clear(&self) -> HealthStateResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.records.clear();
        Ok(())
    }

    async fn list_all(&self) -> HealthStateResult<Vec<ServerHealthState>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.records.values().cloned().collect())
    }
}
