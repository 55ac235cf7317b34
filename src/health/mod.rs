//! Per-server health tracking.
//!
//! Every probe result is folded into a persisted [`domain::ServerHealthState`]
//! and a [`domain::TransitionEvent`] is emitted only when the classified
//! status differs from the last known one. The module follows the usual
//! layout:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The tracker service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
