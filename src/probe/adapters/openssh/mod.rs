//! Transport built on the system OpenSSH client.
//!
//! The transport itself is Unix only; the options are available everywhere
//! so configuration parses on any platform.
//!
//! Each connection is a control-master `ssh` process that performs the TCP
//! connect and authentication. The health command then runs over the master's
//! control socket, and closing the session asks the master to exit. Every
//! connection gets a private `0700` scratch directory holding the control
//! socket, an askpass helper, and (for key authentication) a `0600` identity
//! file. The directory is removed and the master killed when the session is
//! dropped.
//!
//! Secrets reach `ssh` only through the askpass helper's environment and the
//! identity file; they never appear on a command line or in logs.

#[cfg(unix)]
mod args;
#[cfg(unix)]
mod classify;
mod options;
#[cfg(unix)]
mod session;
#[cfg(unix)]
mod transport;

pub use options::{HostKeyPolicy, OpenSshOptions};
#[cfg(unix)]
pub use session::OpenSshSession;
#[cfg(unix)]
pub use transport::OpenSshTransport;
