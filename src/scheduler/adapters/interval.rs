//! Facility backed by tokio interval timers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::scheduler::{
    domain::BackgroundTaskId,
    ports::{BackgroundExecutionFacility, FacilityError, FacilityResult, WakeHandler},
};

/// Runs each registered handler from its own timer task.
///
/// The first wake-up happens one full interval after registration. A wake-up
/// that overruns delays the next one instead of bunching ticks together.
/// Dropping the facility stops every timer.
#[derive(Debug, Default)]
pub struct TokioIntervalFacility {
    timers: Mutex<HashMap<BackgroundTaskId, Timer>>,
}

#[derive(Debug)]
struct Timer {
    period: Duration,
    task: JoinHandle<()>,
}

fn lock_error(err: impl ToString) -> FacilityError {
    FacilityError::unavailable(std::io::Error::other(err.to_string()))
}

impl TokioIntervalFacility {
    /// Creates a facility with no timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BackgroundExecutionFacility for TokioIntervalFacility {
    async fn register(
        &self,
        task_id: &BackgroundTaskId,
        min_interval: Duration,
        handler: Arc<dyn WakeHandler>,
    ) -> FacilityResult<()> {
        if min_interval.is_zero() {
            return Err(FacilityError::Rejected(
                "minimum interval must be positive".to_owned(),
            ));
        }
        let task_label = task_id.to_string();
        let task = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + min_interval, min_interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                debug!(task_id = %task_label, "background wake-up");
                handler.on_wake().await;
            }
        });

        let mut timers = self.timers.lock().map_err(lock_error)?;
        let timer = Timer {
            period: min_interval,
            task,
        };
        if let Some(previous) = timers.insert(task_id.clone(), timer) {
            previous.task.abort();
        }
        info!(task_id = %task_id, interval_secs = min_interval.as_secs(), "timer registered");
        Ok(())
    }

    async fn unregister(&self, task_id: &BackgroundTaskId) -> FacilityResult<bool> {
        let mut timers = self.timers.lock().map_err(lock_error)?;
        let removed = timers.remove(task_id);
        let existed = removed.is_some();
        if let Some(timer) = removed {
            timer.task.abort();
            info!(task_id = %task_id, "timer removed");
        }
        Ok(existed)
    }

    async fn registered_interval(
        &self,
        task_id: &BackgroundTaskId,
    ) -> FacilityResult<Option<Duration>> {
        let timers = self.timers.lock().map_err(lock_error)?;
        Ok(timers
            .get(task_id)
            .filter(|timer| !timer.task.is_finished())
            .map(|timer| timer.period))
    }
}

impl Drop for TokioIntervalFacility {
    fn drop(&mut self) {
        if let Ok(mut timers) = self.timers.lock() {
            for (_, timer) in timers.drain() {
                timer.task.abort();
            }
        }
    }
}
