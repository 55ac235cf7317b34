//! Serverwatch: background health monitoring for SSH servers.
//!
//! The engine periodically connects to every monitored server, runs a
//! harmless command, classifies the outcome, keeps each server's last-known
//! status on disk, and raises an alert whenever that status changes.
//!
//! # Architecture
//!
//! Serverwatch follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (files, `ssh`, timers)
//!
//! # Modules
//!
//! - [`inventory`]: Server definitions, settings, and credentials
//! - [`probe`]: Secure-shell health probing
//! - [`health`]: Per-server health state and transition detection
//! - [`scheduler`]: Registration of the recurring background task
//! - [`monitoring`]: Monitoring passes, alerts, and user controls
//! - [`config`]: Engine configuration
//! - [`telemetry`]: Tracing set-up

pub mod config;
pub mod health;
pub mod inventory;
pub mod monitoring;
pub mod probe;
pub mod scheduler;
pub mod shell;
pub mod storage;
pub mod telemetry;
