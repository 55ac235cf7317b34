//! Result of one monitoring pass.

use crate::health::domain::{HealthStatus, TransitionEvent};
use chrono::{DateTime, Utc};

/// Number of results per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    /// Healthy results.
    pub healthy: usize,
    /// Unreachable results.
    pub unreachable: usize,
    /// Authentication failures.
    pub auth_failed: usize,
    /// Timeouts, including abandoned probes.
    pub timeout: usize,
    /// Unclassified failures.
    pub unknown: usize,
}

impl OutcomeCounts {
    /// Counts one result.
    pub const fn record(&mut self, status: HealthStatus) {
        match status {
            HealthStatus::Healthy => self.healthy += 1,
            HealthStatus::Unreachable => self.unreachable += 1,
            HealthStatus::AuthFailed => self.auth_failed += 1,
            HealthStatus::Timeout => self.timeout += 1,
            HealthStatus::Unknown => self.unknown += 1,
        }
    }

    /// Returns the count for one status.
    #[must_use]
    pub const fn get(&self, status: HealthStatus) -> usize {
        match status {
            HealthStatus::Healthy => self.healthy,
            HealthStatus::Unreachable => self.unreachable,
            HealthStatus::AuthFailed => self.auth_failed,
            HealthStatus::Timeout => self.timeout,
            HealthStatus::Unknown => self.unknown,
        }
    }

    /// Returns the number of results counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.healthy + self.unreachable + self.auth_failed + self.timeout + self.unknown
    }
}

/// What a pass did.
///
/// Individual probe, persistence, and notification failures are counted here
/// rather than failing the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSummary {
    /// When the pass began.
    pub started_at: DateTime<Utc>,
    /// When the pass ended.
    pub finished_at: DateTime<Utc>,
    /// Whether monitoring was disabled, making this an empty pass.
    pub skipped_disabled: bool,
    /// Whether the pass was cancelled before every probe finished.
    pub cancelled: bool,
    /// Results per status.
    pub outcomes: OutcomeCounts,
    /// Transitions detected, in commit order.
    pub transitions: Vec<TransitionEvent>,
    /// Alerts handed to the dispatcher.
    pub notifications_requested: usize,
    /// Alerts the dispatcher failed or timed out on.
    pub notifications_failed: usize,
    /// Results whose state could not be persisted.
    pub persist_failures: usize,
}

impl PassSummary {
    /// Starts an empty summary.
    #[must_use]
    pub const fn started(at: DateTime<Utc>) -> Self {
        Self {
            started_at: at,
            finished_at: at,
            skipped_disabled: false,
            cancelled: false,
            outcomes: OutcomeCounts {
                healthy: 0,
                unreachable: 0,
                auth_failed: 0,
                timeout: 0,
                unknown: 0,
            },
            transitions: Vec::new(),
            notifications_requested: 0,
            notifications_failed: 0,
            persist_failures: 0,
        }
    }

    /// Returns the summary of a pass skipped because monitoring is off.
    #[must_use]
    pub const fn disabled(at: DateTime<Utc>) -> Self {
        let mut summary = Self::started(at);
        summary.skipped_disabled = true;
        summary
    }

    /// Returns the number of servers checked.
    #[must_use]
    pub const fn servers_checked(&self) -> usize {
        self.outcomes.total()
    }
}
