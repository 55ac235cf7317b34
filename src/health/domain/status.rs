//! Health status classification.

use super::ParseHealthStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome class of one health probe.
///
/// `Timeout` and `Unknown` are distinct statuses; moving between them is a
/// transition like any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// The health command completed normally.
    Healthy,
    /// The host could not be reached.
    Unreachable,
    /// The server rejected the credentials, or none could be resolved.
    AuthFailed,
    /// A step did not finish within its time budget.
    Timeout,
    /// Any other failure, and the status of a server never checked.
    #[default]
    Unknown,
}

impl HealthStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Healthy,
        Self::Unreachable,
        Self::AuthFailed,
        Self::Timeout,
        Self::Unknown,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unreachable => "unreachable",
            Self::AuthFailed => "auth_failed",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }

    /// Returns whether this is [`HealthStatus::Healthy`].
    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HealthStatus {
    type Error = ParseHealthStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseHealthStatusError(value.to_owned()))
    }
}
