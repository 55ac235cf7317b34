//! Credential store port.

use crate::inventory::domain::{CredentialRef, Secret};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for credential store operations.
pub type CredentialStoreResult<T> = Result<T, CredentialStoreError>;

/// Secure credential lookup contract.
///
/// Implementations must never log resolved secrets.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Resolves a credential reference into secret material.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::NotFound`] when nothing is stored under
    /// the reference, or [`CredentialStoreError::Unavailable`] when the store
    /// cannot be read right now (for example, while the device is locked).
    async fn resolve(&self, credential_ref: &CredentialRef) -> CredentialStoreResult<Secret>;

    /// Deletes every stored credential.
    async fn clear(&self) -> CredentialStoreResult<()>;
}

/// Errors returned by credential store implementations.
#[derive(Debug, Clone, Error)]
pub enum CredentialStoreError {
    /// No secret exists for the reference.
    #[error("no credential stored for '{0}'")]
    NotFound(CredentialRef),

    /// The store refused access.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    /// Storage-layer failure.
    #[error("credential storage error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CredentialStoreError {
    /// Wraps a storage-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
