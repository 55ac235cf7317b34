//! Identifier of a recurring background task.

use std::fmt;

/// Name under which a task is registered with the host facility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackgroundTaskId(String);

impl BackgroundTaskId {
    /// Identifier of the monitoring pass task.
    pub const MONITORING: &'static str = "serverwatch.monitoring";

    /// Creates an identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier of the monitoring pass task.
    #[must_use]
    pub fn monitoring() -> Self {
        Self::new(Self::MONITORING)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackgroundTaskId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}
