//! Application services for health state tracking.

mod tracker;

pub use tracker::{ServerStateTracker, TrackerError, TrackerResult};
