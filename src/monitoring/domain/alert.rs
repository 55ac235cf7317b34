//! Alert requests raised on status transitions.

use crate::health::domain::{HealthStatus, TransitionEvent};
use crate::inventory::domain::{ServerDefinition, ServerId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// How loudly a transition should be announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// A server recovered.
    Info,
    /// An unhealthy server changed failure mode.
    Warning,
    /// A healthy server stopped responding properly.
    Critical,
}

impl AlertSeverity {
    /// Classifies a transition.
    ///
    /// Reaching `Healthy` is a recovery, leaving it is critical, and moving
    /// between two unhealthy statuses (including the never-checked
    /// `Unknown`) is a warning.
    #[must_use]
    pub const fn for_transition(event: &TransitionEvent) -> Self {
        if event.is_recovery() {
            Self::Info
        } else if event.from.is_healthy() {
            Self::Critical
        } else {
            Self::Warning
        }
    }

    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A request for one user-facing alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertRequest {
    /// Server the alert is about.
    pub server_id: ServerId,
    /// Server display label.
    pub label: String,
    /// Server host name.
    pub host: String,
    /// Status before the transition.
    pub from: HealthStatus,
    /// Status after the transition.
    pub to: HealthStatus,
    /// Alert severity.
    pub severity: AlertSeverity,
    /// When the transition was observed.
    pub timestamp: DateTime<Utc>,
    /// Rendered alert text.
    pub message: String,
}

impl AlertRequest {
    /// Builds an alert for `event` on `server`, with an empty message.
    #[must_use]
    pub fn for_transition(server: &ServerDefinition, event: &TransitionEvent) -> Self {
        Self {
            server_id: event.server_id,
            label: server.label().to_owned(),
            host: server.host().to_owned(),
            from: event.from,
            to: event.to,
            severity: AlertSeverity::for_transition(event),
            timestamp: event.timestamp,
            message: String::new(),
        }
    }

    /// Sets the rendered message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}
