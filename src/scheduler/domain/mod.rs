//! Domain types for background task registration.

mod registration;
mod task_id;

pub use registration::{RegistrationOutcome, RegistrationState};
pub use task_id::BackgroundTaskId;
