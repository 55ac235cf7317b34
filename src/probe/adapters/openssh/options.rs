//! Client options for the OpenSSH transport.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How unknown or changed host keys are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Only connect to hosts already in `known_hosts`.
    Strict,
    /// Record keys of new hosts; refuse changed keys.
    #[default]
    AcceptNew,
    /// Skip host key verification.
    Off,
}

impl HostKeyPolicy {
    /// Returns the `StrictHostKeyChecking` option value.
    #[must_use]
    pub const fn as_option_value(self) -> &'static str {
        match self {
            Self::Strict => "yes",
            Self::AcceptNew => "accept-new",
            Self::Off => "no",
        }
    }
}

/// Settings shared by every connection the transport opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSshOptions {
    /// The `ssh` executable, looked up on `PATH` when relative.
    pub ssh_binary: Utf8PathBuf,
    /// Budget for TCP connect and key exchange, passed as `ConnectTimeout`.
    pub connect_timeout: Duration,
    /// Host key checking policy.
    pub host_key_policy: HostKeyPolicy,
    /// Alternative `known_hosts` file.
    pub known_hosts_file: Option<Utf8PathBuf>,
}

impl Default for OpenSshOptions {
    fn default() -> Self {
        Self {
            ssh_binary: Utf8PathBuf::from("ssh"),
            connect_timeout: Duration::from_secs(10),
            host_key_policy: HostKeyPolicy::default(),
            known_hosts_file: None,
        }
    }
}
