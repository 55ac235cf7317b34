//! Idempotent registration of the monitoring wake-up.

use crate::inventory::ports::{ConfigStore, ConfigStoreError};
use crate::scheduler::{
    domain::{BackgroundTaskId, RegistrationOutcome, RegistrationState},
    ports::{BackgroundExecutionFacility, FacilityError, WakeHandler},
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Service-level errors for registration operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Monitoring settings could not be read.
    #[error("could not read monitoring settings: {0}")]
    ConfigRead(#[from] ConfigStoreError),

    /// The host facility failed or refused the request.
    #[error("background registration failed: {0}")]
    Registration(#[from] FacilityError),

    /// A registration step would skip part of the lifecycle.
    #[error("registration cannot move from {from} to {to}")]
    IllegalStep {
        /// State before the step.
        from: RegistrationState,
        /// Requested state.
        to: RegistrationState,
    },
}

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Keeps the host registration in line with the monitoring settings.
///
/// Every operation asks the facility what it currently holds, including the
/// interval, instead of trusting the in-process [`RegistrationState`], so
/// calls are idempotent across process restarts and pick up interval changes
/// saved by another process. Operations are serialized and every state change
/// follows [`RegistrationState::can_transition_to`].
pub struct BackgroundTaskScheduler<F, S>
where
    F: BackgroundExecutionFacility,
    S: ConfigStore,
{
    facility: Arc<F>,
    config: Arc<S>,
    handler: Arc<dyn WakeHandler>,
    task_id: BackgroundTaskId,
    state: Mutex<RegistrationState>,
}

impl<F, S> BackgroundTaskScheduler<F, S>
where
    F: BackgroundExecutionFacility,
    S: ConfigStore,
{
    /// Creates a scheduler for the monitoring task.
    #[must_use]
    pub fn new(facility: Arc<F>, config: Arc<S>, handler: Arc<dyn WakeHandler>) -> Self {
        Self::with_task_id(facility, config, handler, BackgroundTaskId::monitoring())
    }

    /// Creates a scheduler registering under a custom task identifier.
    #[must_use]
    pub fn with_task_id(
        facility: Arc<F>,
        config: Arc<S>,
        handler: Arc<dyn WakeHandler>,
        task_id: BackgroundTaskId,
    ) -> Self {
        Self {
            facility,
            config,
            handler,
            task_id,
            state: Mutex::new(RegistrationState::Unregistered),
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task_id(&self) -> &BackgroundTaskId {
        &self.task_id
    }

    /// Returns the last observed registration state.
    pub async fn state(&self) -> RegistrationState {
        *self.state.lock().await
    }

    /// Registers the wake-up when monitoring is enabled and the host does not
    /// already hold it with the configured interval. A registration held with
    /// another interval is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ConfigRead`] when settings cannot be read and
    /// [`SchedulerError::Registration`] when the facility fails. A failed
    /// registration leaves the state `Unregistered` so the caller can retry.
    pub async fn ensure_registered(&self) -> SchedulerResult<RegistrationOutcome> {
        let mut state = self.state.lock().await;
        self.register_locked(&mut state).await
    }

    /// Removes the wake-up if the host holds it.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Registration`] when the facility fails.
    pub async fn ensure_unregistered(&self) -> SchedulerResult<RegistrationOutcome> {
        let mut state = self.state.lock().await;
        self.unregister_locked(&mut state).await
    }

    /// Re-registers with the current interval after a settings change.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] when settings cannot be read or the
    /// facility fails.
    pub async fn reschedule(&self) -> SchedulerResult<RegistrationOutcome> {
        let mut state = self.state.lock().await;
        self.unregister_locked(&mut state).await?;
        self.register_locked(&mut state).await
    }

    /// Reconciles the host registration with the settings on a cold start.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] when settings cannot be read or the
    /// facility fails.
    pub async fn start_up(&self) -> SchedulerResult<RegistrationOutcome> {
        let mut state = self.state.lock().await;
        let settings = self.config.get_settings().await?;
        let outcome = if settings.enabled {
            self.register_locked(&mut state).await?
        } else {
            self.unregister_locked(&mut state).await?
        };
        info!(
            task_id = %self.task_id,
            enabled = settings.enabled,
            state = %*state,
            "background registration reconciled"
        );
        Ok(outcome)
    }

    async fn register_locked(
        &self,
        state: &mut RegistrationState,
    ) -> SchedulerResult<RegistrationOutcome> {
        let held = self.observe(state).await?;
        let settings = self.config.get_settings().await?;
        if !settings.enabled {
            return Ok(RegistrationOutcome::SkippedDisabled);
        }

        let interval = settings.check_interval;
        match held {
            Some(current) if current == interval.as_duration() => {
                Ok(RegistrationOutcome::AlreadyRegistered)
            }
            Some(current) => {
                info!(
                    task_id = %self.task_id,
                    held_secs = current.as_secs(),
                    interval = %interval,
                    "registered interval is stale; re-registering"
                );
                self.remove_locked(state).await?;
                self.install_locked(state, interval.as_duration()).await?;
                Ok(RegistrationOutcome::Rescheduled)
            }
            None => {
                self.install_locked(state, interval.as_duration()).await?;
                Ok(RegistrationOutcome::Registered)
            }
        }
    }

    async fn unregister_locked(
        &self,
        state: &mut RegistrationState,
    ) -> SchedulerResult<RegistrationOutcome> {
        if self.observe(state).await?.is_none() {
            return Ok(RegistrationOutcome::AlreadyUnregistered);
        }
        self.remove_locked(state).await?;
        Ok(RegistrationOutcome::Unregistered)
    }

    /// Brings the in-process state in line with what the host holds.
    async fn observe(&self, state: &mut RegistrationState) -> SchedulerResult<Option<Duration>> {
        let held = self.facility.registered_interval(&self.task_id).await?;
        let settled = if held.is_some() {
            RegistrationState::Registered
        } else {
            RegistrationState::Unregistered
        };
        advance(state, settled)?;
        Ok(held)
    }

    async fn install_locked(
        &self,
        state: &mut RegistrationState,
        interval: Duration,
    ) -> SchedulerResult<()> {
        advance(state, RegistrationState::Registering)?;
        match self
            .facility
            .register(&self.task_id, interval, Arc::clone(&self.handler))
            .await
        {
            Ok(()) => {
                advance(state, RegistrationState::Registered)?;
                info!(
                    task_id = %self.task_id,
                    interval_secs = interval.as_secs(),
                    "background task registered"
                );
                Ok(())
            }
            Err(err) => {
                advance(state, RegistrationState::Unregistered)?;
                warn!(task_id = %self.task_id, error = %err, "background registration failed");
                Err(err.into())
            }
        }
    }

    async fn remove_locked(&self, state: &mut RegistrationState) -> SchedulerResult<()> {
        advance(state, RegistrationState::Unregistering)?;
        match self.facility.unregister(&self.task_id).await {
            Ok(_) => {
                advance(state, RegistrationState::Unregistered)?;
                info!(task_id = %self.task_id, "background task unregistered");
                Ok(())
            }
            Err(err) => {
                advance(state, RegistrationState::Registered)?;
                warn!(task_id = %self.task_id, error = %err, "background removal failed");
                Err(err.into())
            }
        }
    }
}

/// Moves `state` to `next`, refusing steps outside the lifecycle.
fn advance(state: &mut RegistrationState, next: RegistrationState) -> SchedulerResult<()> {
    if !state.can_transition_to(next) {
        warn!(from = %*state, to = %next, "illegal registration step refused");
        return Err(SchedulerError::IllegalStep {
            from: *state,
            to: next,
        });
    }
    *state = next;
    Ok(())
}
