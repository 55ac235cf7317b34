//! Port contracts for secure-shell transports.

mod transport;

pub use transport::{SshSession, SshTransport, SshTransportError, SshTransportResult};
