//! Port contracts for health state persistence.

mod repository;

pub use repository::{HealthStateRepository, HealthStateRepositoryError, HealthStateResult};

#[cfg(test)]
pub(crate) use repository::MockHealthStateRepository;
