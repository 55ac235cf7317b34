//! Domain model for monitored servers and monitoring settings.
//!
//! Server definitions carry a credential reference, never the secret itself.
//! Secrets only exist transiently as [`Secret`] values resolved through the
//! credential port.

mod error;
mod ids;
mod secret;
mod server;
mod settings;

pub use error::InventoryDomainError;
pub use ids::{CredentialRef, ServerId};
pub use secret::Secret;
pub use server::ServerDefinition;
pub use settings::{CheckInterval, MonitoringSettings, SettingsUpdate};
