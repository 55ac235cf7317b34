//! Domain model for health classification and state transitions.

mod error;
mod result;
mod state;
mod status;
mod transition;

pub use error::ParseHealthStatusError;
pub use result::HealthCheckResult;
pub use state::ServerHealthState;
pub use status::HealthStatus;
pub use transition::TransitionEvent;
