//! In-memory configuration store.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::inventory::{
    domain::{MonitoringSettings, ServerDefinition, ServerId, SettingsUpdate},
    ports::{ConfigStore, ConfigStoreError, ConfigStoreResult},
};

/// Thread-safe in-memory configuration store.
///
/// Server order is insertion order. Reads can be made to fail with
/// [`InMemoryConfigStore::set_unavailable`] so callers can exercise their
/// error paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigStore {
    state: Arc<RwLock<InMemoryConfigState>>,
}

#[derive(Debug, Default)]
struct InMemoryConfigState {
    settings: Option<MonitoringSettings>,
    servers: Vec<ServerDefinition>,
    unavailable: bool,
}

fn lock_error(err: impl ToString) -> ConfigStoreError {
    ConfigStoreError::persistence(std::io::Error::other(err.to_string()))
}

fn unavailable_error() -> ConfigStoreError {
    ConfigStoreError::persistence(std::io::Error::other("configuration store unavailable"))
}

impl InMemoryConfigStore {
    /// Creates an empty store with no settings record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with a settings record.
    #[must_use]
    pub fn with_settings(settings: MonitoringSettings) -> Self {
        let state = InMemoryConfigState {
            settings: Some(settings),
            ..InMemoryConfigState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Adds or replaces a server definition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError::Persistence`] if the state lock is poisoned.
    pub fn insert_server(&self, server: ServerDefinition) -> ConfigStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        match state.servers.iter_mut().find(|existing| existing.id() == server.id()) {
            Some(existing) => *existing = server,
            None => state.servers.push(server),
        }
        Ok(())
    }

    /// Removes a server definition, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError::Persistence`] if the state lock is poisoned.
    pub fn remove_server(&self, id: ServerId) -> ConfigStoreResult<bool> {
        let mut state = self.state.write().map_err(lock_error)?;
        let before = state.servers.len();
        state.servers.retain(|server| server.id() != id);
        Ok(state.servers.len() != before)
    }

    /// Makes subsequent operations fail with a persistence error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError::Persistence`] if the state lock is poisoned.
    pub fn set_unavailable(&self, unavailable: bool) -> ConfigStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.unavailable = unavailable;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get_servers(&self) -> ConfigStoreResult<Vec<ServerDefinition>> {
        let state = self.state.read().map_err(lock_error)?;
        if state.unavailable {
            return Err(unavailable_error());
        }
        Ok(state.servers.clone())
    }

    async fn get_settings(&self) -> ConfigStoreResult<MonitoringSettings> {
        let state = self.state.read().map_err(lock_error)?;
        if state.unavailable {
            return Err(unavailable_error());
        }
        Ok(state.settings.unwrap_or_default())
    }

    async fn set_settings(&self, update: &SettingsUpdate) -> ConfigStoreResult<MonitoringSettings> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.unavailable {
            return Err(unavailable_error());
        }
        let merged = update.apply_to(state.settings.unwrap_or_default());
        state.settings = Some(merged);
        Ok(merged)
    }

    async fn clear(&self) -> ConfigStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.unavailable {
            return Err(unavailable_error());
        }
        state.settings = None;
        state.servers.clear();
        Ok(())
    }
}
