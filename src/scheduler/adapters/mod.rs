//! Background-execution facility adapters.
//!
//! - [`manual`] only wakes handlers when told to, for tests and one-shot runs.
//! - [`interval`] wakes handlers from tokio interval timers inside a
//!   long-running daemon.

pub mod interval;
pub mod manual;
