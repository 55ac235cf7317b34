//! Registration lifecycle of the recurring task.

use std::fmt;

/// Process-wide view of the host registration.
///
/// `Unregistered → Registering → Registered → Unregistering → Unregistered`.
/// A failed registration falls back to `Unregistered`; a failed removal
/// stays `Registered`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RegistrationState {
    /// No recurring task is known to exist.
    #[default]
    Unregistered,
    /// A registration request is in flight.
    Registering,
    /// The host holds the recurring task.
    Registered,
    /// A removal request is in flight.
    Unregistering,
}

impl RegistrationState {
    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unregistered => "unregistered",
            Self::Registering => "registering",
            Self::Registered => "registered",
            Self::Unregistering => "unregistering",
        }
    }

    /// Returns whether moving to `next` is a legal step.
    ///
    /// Staying put is always legal. Re-verification against the host may move
    /// between the two settled states directly.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unregistered, Self::Unregistered)
                | (Self::Registering, Self::Registering)
                | (Self::Registered, Self::Registered)
                | (Self::Unregistering, Self::Unregistering)
                | (Self::Unregistered, Self::Registering | Self::Registered)
                | (Self::Registering, Self::Registered | Self::Unregistered)
                | (Self::Registered, Self::Unregistering | Self::Unregistered)
                | (Self::Unregistering, Self::Unregistered | Self::Registered)
        )
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// What a registration call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationOutcome {
    /// The host already held the task; nothing changed.
    AlreadyRegistered,
    /// The task was registered.
    Registered,
    /// The host held the task with a stale interval; it was re-registered.
    Rescheduled,
    /// Monitoring is disabled, so nothing was registered.
    SkippedDisabled,
    /// The task was removed.
    Unregistered,
    /// Nothing was registered, so nothing was removed.
    AlreadyUnregistered,
}

impl RegistrationOutcome {
    /// Returns whether the host holds the task after the call.
    #[must_use]
    pub const fn is_registered(self) -> bool {
        matches!(
            self,
            Self::AlreadyRegistered | Self::Registered | Self::Rescheduled
        )
    }
}
