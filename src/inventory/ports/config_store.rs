//! Configuration store port for server definitions and monitoring settings.

use crate::inventory::domain::{MonitoringSettings, ServerDefinition, SettingsUpdate};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for configuration store operations.
pub type ConfigStoreResult<T> = Result<T, ConfigStoreError>;

/// Narrow read/write contract over the persisted settings record and server
/// list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Returns every server definition, monitored or not.
    async fn get_servers(&self) -> ConfigStoreResult<Vec<ServerDefinition>>;

    /// Returns the current monitoring settings.
    ///
    /// A missing settings record yields [`MonitoringSettings::default`].
    async fn get_settings(&self) -> ConfigStoreResult<MonitoringSettings>;

    /// Merges `update` into the stored settings and returns the result.
    async fn set_settings(&self, update: &SettingsUpdate) -> ConfigStoreResult<MonitoringSettings>;

    /// Removes the settings record and every server definition.
    async fn clear(&self) -> ConfigStoreResult<()>;
}

/// Errors returned by configuration store implementations.
#[derive(Debug, Clone, Error)]
pub enum ConfigStoreError {
    /// Stored data could not be decoded into domain types.
    #[error("invalid persisted configuration: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Storage-layer failure.
    #[error("configuration storage error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ConfigStoreError {
    /// Wraps decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a storage-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
