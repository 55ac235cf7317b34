//! Application services for health probing.

mod prober;

pub use prober::HealthProber;
