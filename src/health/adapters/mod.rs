//! Adapter implementations for the health state repository.

pub mod file;
pub mod memory;
