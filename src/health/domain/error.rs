//! Error types for health domain parsing.

use thiserror::Error;

/// Error returned while parsing a health status label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown health status: {0}")]
pub struct ParseHealthStatusError(pub String);
