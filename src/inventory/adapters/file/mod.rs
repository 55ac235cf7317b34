//! File-backed configuration and credential stores.
//!
//! Both stores live beneath one application data directory:
//!
//! ```text
//! <data-dir>/settings.json
//! <data-dir>/servers.json
//! <data-dir>/credentials/<ref>.key
//! <data-dir>/credentials/<ref>.passphrase
//! <data-dir>/credentials/<ref>.password
//! ```

mod config_store;
mod credentials;

pub use config_store::JsonFileConfigStore;
pub use credentials::KeyFileCredentialStore;
