//! Error types for inventory domain validation.

use thiserror::Error;

/// Errors returned while constructing inventory domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InventoryDomainError {
    /// The host is empty after trimming.
    #[error("server host must not be empty")]
    EmptyHost,

    /// The host contains whitespace or control characters, or starts with `-`.
    #[error("server host '{0}' must not start with '-' or contain whitespace or control characters")]
    InvalidHost(String),

    /// Port zero cannot be connected to.
    #[error("server port must be between 1 and 65535")]
    InvalidPort,

    /// The login user name is empty after trimming.
    #[error("server username must not be empty")]
    EmptyUsername,

    /// The credential reference is empty after trimming.
    #[error("credential reference must not be empty")]
    EmptyCredentialRef,

    /// The credential reference contains characters outside `[A-Za-z0-9_.-]`.
    #[error("credential reference '{0}' contains invalid characters")]
    InvalidCredentialRef(String),

    /// The check interval is not one of the supported values.
    #[error("unsupported check interval of {0} minutes, expected one of 5, 15, 30, 60")]
    UnsupportedCheckInterval(u32),
}
