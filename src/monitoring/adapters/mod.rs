//! Notification dispatcher adapters.
//!
//! - [`recording`] keeps alerts in memory for inspection.
//! - [`log`] writes alerts to the tracing subscriber.

pub mod log;
pub mod recording;
