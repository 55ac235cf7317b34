//! Monitoring passes and the controls around them.
//!
//! A pass reads the settings, probes every monitored server with bounded
//! concurrency, folds each result into the health tracker, and asks the
//! notification dispatcher to alert on every transition. The
//! [`services::PassTrigger`] is the wake-up handler handed to the host
//! facility, and [`services::MonitoringControl`] is the surface user toggles
//! go through.
//!
//! - Domain types in [`domain`]
//! - The dispatcher port in [`ports`]
//! - Dispatcher adapters in [`adapters`]
//! - Pass orchestration and controls in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
