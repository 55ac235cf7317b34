//! Health probe results.

use super::HealthStatus;
use chrono::{DateTime, Utc};

/// Classified outcome of one probe.
///
/// Latency is only ever recorded for healthy results. The optional detail is
/// a diagnostic string and never carries secret material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckResult {
    status: HealthStatus,
    latency_ms: Option<u64>,
    checked_at: DateTime<Utc>,
    detail: Option<String>,
}

impl HealthCheckResult {
    /// Creates a result without latency.
    #[must_use]
    pub const fn new(status: HealthStatus, checked_at: DateTime<Utc>) -> Self {
        Self {
            status,
            latency_ms: None,
            checked_at,
            detail: None,
        }
    }

    /// Creates a healthy result with the command round-trip latency.
    #[must_use]
    pub const fn healthy(latency_ms: u64, checked_at: DateTime<Utc>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            latency_ms: Some(latency_ms),
            checked_at,
            detail: None,
        }
    }

    /// Creates an [`HealthStatus::Unreachable`] result.
    #[must_use]
    pub const fn unreachable(checked_at: DateTime<Utc>) -> Self {
        Self::new(HealthStatus::Unreachable, checked_at)
    }

    /// Creates an [`HealthStatus::AuthFailed`] result.
    #[must_use]
    pub const fn auth_failed(checked_at: DateTime<Utc>) -> Self {
        Self::new(HealthStatus::AuthFailed, checked_at)
    }

    /// Creates a [`HealthStatus::Timeout`] result.
    #[must_use]
    pub const fn timed_out(checked_at: DateTime<Utc>) -> Self {
        Self::new(HealthStatus::Timeout, checked_at)
    }

    /// Creates an [`HealthStatus::Unknown`] result.
    #[must_use]
    pub const fn unknown(checked_at: DateTime<Utc>) -> Self {
        Self::new(HealthStatus::Unknown, checked_at)
    }

    /// Attaches a diagnostic detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Returns the classified status.
    #[must_use]
    pub const fn status(&self) -> HealthStatus {
        self.status
    }

    /// Returns the command round-trip latency for healthy results.
    #[must_use]
    pub const fn latency_ms(&self) -> Option<u64> {
        self.latency_ms
    }

    /// Returns when the probe finished.
    #[must_use]
    pub const fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    /// Returns the diagnostic detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}
