//! Server inventory, monitoring settings, and credential lookup.
//!
//! The inventory is owned by collaborators outside the monitoring engine: the
//! settings store, the server list, and the secure credential store. This
//! module defines the narrow boundary the engine reads through:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
