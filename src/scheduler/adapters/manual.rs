//! Facility that fires only on request.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::scheduler::{
    domain::BackgroundTaskId,
    ports::{BackgroundExecutionFacility, FacilityError, FacilityResult, WakeHandler},
};

/// In-process facility whose wake-ups are triggered explicitly with
/// [`ManualFacility::fire`].
///
/// It records every registration call and can be told to reject the next
/// one or to forget all registrations, mimicking a host that dropped its
/// scheduled work.
#[derive(Clone, Default)]
pub struct ManualFacility {
    state: Arc<RwLock<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    registrations: HashMap<BackgroundTaskId, Registration>,
    register_calls: usize,
    unregister_calls: usize,
    reject_next_register: bool,
}

struct Registration {
    min_interval: Duration,
    handler: Arc<dyn WakeHandler>,
}

fn lock_error(err: impl ToString) -> FacilityError {
    FacilityError::unavailable(std::io::Error::other(err.to_string()))
}

impl ManualFacility {
    /// Creates a facility with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invokes the handler registered under `task_id`, returning whether one
    /// existed.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the state lock is poisoned.
    pub async fn fire(&self, task_id: &BackgroundTaskId) -> FacilityResult<bool> {
        let handler = {
            let state = self.state.read().map_err(lock_error)?;
            state
                .registrations
                .get(task_id)
                .map(|registration| Arc::clone(&registration.handler))
        };
        match handler {
            Some(registered) => {
                registered.on_wake().await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns the number of `register` calls that reached the facility.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the state lock is poisoned.
    pub fn register_calls(&self) -> FacilityResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.register_calls)
    }

    /// Returns the number of `unregister` calls that reached the facility.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the state lock is poisoned.
    pub fn unregister_calls(&self) -> FacilityResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.unregister_calls)
    }

    /// Makes the next `register` call fail.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the state lock is poisoned.
    pub fn reject_next_register(&self) -> FacilityResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.reject_next_register = true;
        Ok(())
    }

    /// Forgets every registration, as a host does after a reinstall.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the state lock is poisoned.
    pub fn drop_registrations(&self) -> FacilityResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.registrations.clear();
        Ok(())
    }
}

#[async_trait]
impl BackgroundExecutionFacility for ManualFacility {
    async fn register(
        &self,
        task_id: &BackgroundTaskId,
        min_interval: Duration,
        handler: Arc<dyn WakeHandler>,
    ) -> FacilityResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.register_calls += 1;
        if state.reject_next_register {
            state.reject_next_register = false;
            return Err(FacilityError::Rejected(format!(
                "host refused to schedule '{task_id}'"
            )));
        }
        state.registrations.insert(
            task_id.clone(),
            Registration {
                min_interval,
                handler,
            },
        );
        Ok(())
    }

    async fn unregister(&self, task_id: &BackgroundTaskId) -> FacilityResult<bool> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.unregister_calls += 1;
        Ok(state.registrations.remove(task_id).is_some())
    }

    async fn registered_interval(
        &self,
        task_id: &BackgroundTaskId,
    ) -> FacilityResult<Option<Duration>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .registrations
            .get(task_id)
            .map(|registration| registration.min_interval))
    }
}
