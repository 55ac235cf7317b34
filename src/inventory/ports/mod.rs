//! Port contracts for the configuration and credential stores.

mod config_store;
mod credentials;

pub use config_store::{ConfigStore, ConfigStoreError, ConfigStoreResult};
pub use credentials::{CredentialStore, CredentialStoreError, CredentialStoreResult};

#[cfg(test)]
pub(crate) use config_store::MockConfigStore;
