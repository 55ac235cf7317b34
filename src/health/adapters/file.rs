//! File-backed health state repository.

use async_trait::async_trait;

use crate::health::{
    domain::ServerHealthState,
    ports::{HealthStateRepository, HealthStateRepositoryError, HealthStateResult},
};
use crate::inventory::domain::ServerId;
use crate::storage::{RecordDir, StorageError};

const RECORD_SUFFIX: &str = ".json";

/// Health state repository writing one `<server-id>.json` record per server.
///
/// Records are replaced atomically, so a save that returned survives a crash.
#[derive(Debug, Clone)]
pub struct FileHealthStateRepository {
    records: RecordDir,
}

fn record_name(server_id: ServerId) -> String {
    format!("{server_id}{RECORD_SUFFIX}")
}

fn map_storage_error(err: StorageError) -> HealthStateRepositoryError {
    if err.is_decode() {
        HealthStateRepositoryError::invalid_persisted_data(err)
    } else {
        HealthStateRepositoryError::persistence(err)
    }
}

impl FileHealthStateRepository {
    /// Creates a repository over an opened record directory.
    #[must_use]
    pub const fn new(records: RecordDir) -> Self {
        Self { records }
    }
}

#[async_trait]
impl HealthStateRepository for FileHealthStateRepository {
    async fn find(&self, server_id: ServerId) -> HealthStateResult<Option<ServerHealthState>> {
        self.records
            .read(&record_name(server_id))
            .await
            .map_err(map_storage_error)
    }

    async fn save(&self, state: &ServerHealthState) -> HealthStateResult<()> {
        self.records
            .write(&record_name(state.server_id()), state)
            .await
            .map_err(map_storage_error)
    }

    async fn delete(&self, server_id: ServerId) -> HealthStateResult<bool> {
        self.records
            .remove(&record_name(server_id))
            .await
            .map_err(map_storage_error)
    }

    async fn clear(&self) -> HealthStateResult<()> {
        let names = self
            .records
            .list(RECORD_SUFFIX)
            .await
            .map_err(map_storage_error)?;
        for name in names {
            self.records.remove(&name).await.map_err(map_storage_error)?;
        }
        Ok(())
    }

    async fn list_all(&self) -> HealthStateResult<Vec<ServerHealthState>> {
        let names = self
            .records
            .list(RECORD_SUFFIX)
            .await
            .map_err(map_storage_error)?;
        let mut states = Vec::with_capacity(names.len());
        for name in names {
            let stored: Option<ServerHealthState> =
                self.records.read(&name).await.map_err(map_storage_error)?;
            states.extend(stored);
        }
        states.sort_by_key(ServerHealthState::server_id);
        Ok(states)
    }
}
