//! In-memory credential store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::inventory::{
    domain::{CredentialRef, Secret},
    ports::{CredentialStore, CredentialStoreError, CredentialStoreResult},
};

/// Thread-safe in-memory credential store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    state: Arc<RwLock<InMemoryCredentialState>>,
}

#[derive(Debug, Default)]
struct InMemoryCredentialState {
    secrets: HashMap<CredentialRef, Secret>,
    locked: bool,
}

fn lock_error(err: impl ToString) -> CredentialStoreError {
    CredentialStoreError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a secret under `credential_ref`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::Persistence`] if the state lock is
    /// poisoned.
    pub fn insert(&self, credential_ref: CredentialRef, secret: Secret) -> CredentialStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.secrets.insert(credential_ref, secret);
        Ok(())
    }

    /// Simulates a locked keystore: while locked, every lookup reports
    /// [`CredentialStoreError::Unavailable`].
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::Persistence`] if the state lock is
    /// poisoned.
    pub fn set_locked(&self, locked: bool) -> CredentialStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.locked = locked;
        Ok(())
    }

    /// Returns the number of stored secrets.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::Persistence`] if the state lock is
    /// poisoned.
    pub fn len(&self) -> CredentialStoreResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.secrets.len())
    }

    /// Returns whether the store holds no secrets.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::Persistence`] if the state lock is
    /// poisoned.
    pub fn is_empty(&self) -> CredentialStoreResult<bool> {
        self.len().map(|count| count == 0)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn resolve(&self, credential_ref: &CredentialRef) -> CredentialStoreResult<Secret> {
        let state = self.state.read().map_err(lock_error)?;
        if state.locked {
            return Err(CredentialStoreError::Unavailable(
                "credential store is locked".to_owned(),
            ));
        }
        state
            .secrets
            .get(credential_ref)
            .cloned()
            .ok_or_else(|| CredentialStoreError::NotFound(credential_ref.clone()))
    }

    async fn clear(&self) -> CredentialStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.secrets.clear();
        Ok(())
    }
}
