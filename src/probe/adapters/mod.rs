//! Transport adapters.
//!
//! - [`scripted`] replays per-server behaviour without touching the network.
//! - [`openssh`] drives the system OpenSSH client (the transport is Unix only).

pub mod openssh;
pub mod scripted;
