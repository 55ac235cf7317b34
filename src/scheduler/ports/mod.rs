//! Port contracts for the host background-execution facility.

mod facility;

pub use facility::{BackgroundExecutionFacility, FacilityError, FacilityResult, WakeHandler};

#[cfg(test)]
pub(crate) use facility::MockBackgroundExecutionFacility;
