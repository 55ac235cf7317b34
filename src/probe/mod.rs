//! Secure-shell health probing.
//!
//! A probe connects to one server, authenticates, runs a fixed side-effect
//! free command, classifies the outcome as a
//! [`crate::health::domain::HealthCheckResult`], and always releases the
//! connection. Probes never touch stored state.
//!
//! - Domain types in [`domain`]
//! - The transport port in [`ports`]
//! - Transport adapters in [`adapters`]
//! - The prober service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
