//! Recurring wake-up registration with the host background-execution
//! facility.
//!
//! The host owns the timer; this module only asks it to invoke a
//! [`ports::WakeHandler`] no more often than the configured check interval,
//! and re-verifies that registration on every cold start.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Facility adapters in [`adapters`]
//! - The registration service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
