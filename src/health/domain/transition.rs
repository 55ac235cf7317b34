//! Status transition events.

use super::HealthStatus;
use crate::inventory::domain::ServerId;
use chrono::{DateTime, Utc};

/// Emitted when a server's classified status changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEvent {
    /// Server whose status changed.
    pub server_id: ServerId,
    /// Status before the probe.
    pub from: HealthStatus,
    /// Status reported by the probe.
    pub to: HealthStatus,
    /// When the change was observed.
    pub timestamp: DateTime<Utc>,
}

impl TransitionEvent {
    /// Returns whether the server came back to [`HealthStatus::Healthy`].
    #[must_use]
    pub const fn is_recovery(&self) -> bool {
        self.to.is_healthy()
    }
}
