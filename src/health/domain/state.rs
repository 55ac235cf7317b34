//! Last-known health state for one server.

use super::{HealthCheckResult, HealthStatus, TransitionEvent};
use crate::inventory::domain::ServerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted health record for one server.
///
/// `previous_status` and `last_changed_at` only move when `current_status`
/// changes. `last_checked_at` and `last_latency_ms` are refreshed by every
/// probe and play no part in transition detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerHealthState {
    server_id: ServerId,
    current_status: HealthStatus,
    previous_status: HealthStatus,
    last_changed_at: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    #[serde(default)]
    last_checked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    last_latency_ms: Option<u64>,
}

impl ServerHealthState {
    /// Returns the state of a server that has never been checked.
    #[must_use]
    pub const fn initial(server_id: ServerId) -> Self {
        Self {
            server_id,
            current_status: HealthStatus::Unknown,
            previous_status: HealthStatus::Unknown,
            last_changed_at: None,
            consecutive_failures: 0,
            last_checked_at: None,
            last_latency_ms: None,
        }
    }

    /// Folds a probe result into the state.
    ///
    /// Returns a transition event when the status changed. An unchanged
    /// healthy status resets the failure streak; an unchanged unhealthy one
    /// extends it. A change restarts the streak at zero or one.
    pub fn apply(&mut self, result: &HealthCheckResult) -> Option<TransitionEvent> {
        let status = result.status();
        self.last_checked_at = Some(result.checked_at());
        self.last_latency_ms = result.latency_ms();

        if status == self.current_status {
            self.consecutive_failures = if status.is_healthy() {
                0
            } else {
                self.consecutive_failures.saturating_add(1)
            };
            return None;
        }

        let from = self.current_status;
        self.previous_status = from;
        self.current_status = status;
        self.last_changed_at = Some(result.checked_at());
        self.consecutive_failures = u32::from(!status.is_healthy());

        Some(TransitionEvent {
            server_id: self.server_id,
            from,
            to: status,
            timestamp: result.checked_at(),
        })
    }

    /// Returns the server identifier.
    #[must_use]
    pub const fn server_id(&self) -> ServerId {
        self.server_id
    }

    /// Returns the latest classified status.
    #[must_use]
    pub const fn current_status(&self) -> HealthStatus {
        self.current_status
    }

    /// Returns the status before the most recent change.
    #[must_use]
    pub const fn previous_status(&self) -> HealthStatus {
        self.previous_status
    }

    /// Returns when the status last changed.
    #[must_use]
    pub const fn last_changed_at(&self) -> Option<DateTime<Utc>> {
        self.last_changed_at
    }

    /// Returns the number of consecutive unhealthy results.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Returns when the server was last probed.
    #[must_use]
    pub const fn last_checked_at(&self) -> Option<DateTime<Utc>> {
        self.last_checked_at
    }

    /// Returns the latency of the most recent probe, when it was healthy.
    #[must_use]
    pub const fn last_latency_ms(&self) -> Option<u64> {
        self.last_latency_ms
    }
}
