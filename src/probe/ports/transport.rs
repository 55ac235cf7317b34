//! Secure-shell transport port.

use crate::inventory::domain::{Secret, ServerDefinition};
use crate::probe::domain::CommandOutput;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for transport operations.
pub type SshTransportResult<T> = Result<T, SshTransportError>;

/// Opens authenticated sessions to servers.
///
/// Implementations must not log or persist the secret they are handed.
#[async_trait]
pub trait SshTransport: Send + Sync {
    /// Connects to `server` and authenticates with `secret`.
    ///
    /// Dropping the returned future before it resolves must abandon the
    /// attempt and release everything it acquired.
    async fn connect(
        &self,
        server: &ServerDefinition,
        secret: &Secret,
    ) -> SshTransportResult<Box<dyn SshSession>>;
}

/// An authenticated connection.
///
/// Dropping a session without calling [`SshSession::close`] must still
/// release the underlying connection.
#[async_trait]
pub trait SshSession: Send {
    /// Runs a command line and waits for it to finish.
    ///
    /// A command that ran and exited, with any status, is `Ok`.
    async fn exec(&mut self, command: &str) -> SshTransportResult<CommandOutput>;

    /// Closes the connection gracefully.
    async fn close(self: Box<Self>) -> SshTransportResult<()>;
}

/// Transport failures, already classified by cause.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SshTransportError {
    /// The host could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server rejected the credentials.
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// The transport gave up waiting.
    #[error("transport timed out: {0}")]
    TimedOut(String),

    /// Any other protocol or client failure.
    #[error("protocol failure: {0}")]
    Protocol(String),
}
