//! Domain types for health probing.

mod command;

pub use command::{CommandOutput, HealthCommand, HealthCommandError};
