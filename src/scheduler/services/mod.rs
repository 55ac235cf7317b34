//! Application services for background task registration.

mod registration;

pub use registration::{BackgroundTaskScheduler, SchedulerError, SchedulerResult};
