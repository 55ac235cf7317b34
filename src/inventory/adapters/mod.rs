//! Adapter implementations for the inventory ports.
//!
//! - [`memory`] keeps everything in process, for tests and embedding.
//! - [`file`] persists JSON records beneath an application data directory.

pub mod file;
pub mod memory;
