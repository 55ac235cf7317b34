//! In-memory configuration and credential stores.

mod config_store;
mod credentials;

pub use config_store::InMemoryConfigStore;
pub use credentials::InMemoryCredentialStore;
