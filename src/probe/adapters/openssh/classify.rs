//! Maps `ssh` client diagnostics to transport errors.

use crate::probe::ports::SshTransportError;

const AUTH_MARKERS: &[&str] = &[
    "permission denied",
    "too many authentication failures",
    "authentication failed",
    "no supported authentication methods",
];

const TIMEOUT_MARKERS: &[&str] = &["timed out", "timeout"];

const CONNECT_MARKERS: &[&str] = &[
    "connection refused",
    "no route to host",
    "could not resolve hostname",
    "name or service not known",
    "network is unreachable",
    "host is down",
    "connection reset",
];

/// Classifies the standard error of a failed `ssh` run.
pub(super) fn classify_failure(stderr: &str) -> SshTransportError {
    let message = stderr
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .unwrap_or("ssh exited without diagnostics")
        .to_owned();
    let lowered = stderr.to_ascii_lowercase();
    let mentions = |markers: &[&str]| markers.iter().any(|marker| lowered.contains(marker));

    if mentions(AUTH_MARKERS) {
        SshTransportError::AuthRejected(message)
    } else if mentions(TIMEOUT_MARKERS) {
        SshTransportError::TimedOut(message)
    } else if mentions(CONNECT_MARKERS) {
        SshTransportError::Connect(message)
    } else {
        SshTransportError::Protocol(message)
    }
}
