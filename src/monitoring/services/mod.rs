//! Application services for monitoring passes.

mod control;
mod orchestrator;
mod trigger;

pub use control::{ControlError, ControlResult, MonitoringControl, MonitoringStatus, ToggleOutcome};
pub use orchestrator::{MonitoringPassOrchestrator, PassError, PassOptions, PassResult};
pub use trigger::{PassRunner, PassTrigger};

#[cfg(test)]
pub(crate) use trigger::MockPassRunner;
