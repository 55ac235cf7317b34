//! User-facing monitoring controls.

use crate::health::{
    domain::ServerHealthState,
    ports::HealthStateRepository,
    services::{ServerStateTracker, TrackerError},
};
use crate::inventory::{
    domain::{CheckInterval, InventoryDomainError, MonitoringSettings, ServerId, SettingsUpdate},
    ports::{ConfigStore, ConfigStoreError, CredentialStore, CredentialStoreError},
};
use crate::monitoring::domain::PassSummary;
use crate::scheduler::{
    domain::{RegistrationOutcome, RegistrationState},
    ports::BackgroundExecutionFacility,
    services::{BackgroundTaskScheduler, SchedulerError, SchedulerResult},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::orchestrator::PassError;
use super::trigger::{PassRunner, PassTrigger};

/// Errors returned by monitoring controls.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Settings or servers could not be read or written.
    #[error(transparent)]
    Config(#[from] ConfigStoreError),
    /// Credentials could not be cleared.
    #[error(transparent)]
    Credentials(#[from] CredentialStoreError),
    /// Health state could not be read or removed.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    /// The background task could not be removed.
    #[error(transparent)]
    Registration(#[from] SchedulerError),
    /// The requested check interval is not supported.
    #[error(transparent)]
    InvalidInterval(#[from] InventoryDomainError),
    /// A manual pass failed.
    #[error(transparent)]
    Pass(#[from] PassError),
}

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Outcome of a settings change.
///
/// Settings are saved even when the background registration fails; the
/// failure is reported in `warning` so the user can retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Settings after the change.
    pub settings: MonitoringSettings,
    /// What the scheduler did, if it was asked to act.
    pub registration: Option<RegistrationOutcome>,
    /// Non-fatal registration failure.
    pub warning: Option<String>,
}

impl ToggleOutcome {
    const fn settings_only(settings: MonitoringSettings) -> Self {
        Self {
            settings,
            registration: None,
            warning: None,
        }
    }

    fn with_registration(settings: MonitoringSettings, result: SchedulerResult<RegistrationOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                settings,
                registration: Some(outcome),
                warning: None,
            },
            Err(err) => {
                warn!(error = %err, "background registration not updated");
                Self {
                    settings,
                    registration: None,
                    warning: Some(err.to_string()),
                }
            }
        }
    }
}

/// Snapshot of the monitoring engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringStatus {
    /// Stored settings.
    pub settings: MonitoringSettings,
    /// In-process registration view.
    pub registration: RegistrationState,
    /// Last-known health of every tracked server.
    pub servers: Vec<ServerHealthState>,
}

/// Entry point for the toggle surface.
pub struct MonitoringControl<S, K, R, F, P>
where
    S: ConfigStore,
    K: CredentialStore,
    R: HealthStateRepository,
    F: BackgroundExecutionFacility,
    P: PassRunner,
{
    config: Arc<S>,
    credentials: Arc<K>,
    tracker: ServerStateTracker<R>,
    scheduler: Arc<BackgroundTaskScheduler<F, S>>,
    trigger: Arc<PassTrigger<P>>,
}

impl<S, K, R, F, P> MonitoringControl<S, K, R, F, P>
where
    S: ConfigStore,
    K: CredentialStore,
    R: HealthStateRepository,
    F: BackgroundExecutionFacility,
    P: PassRunner,
{
    /// Creates the control surface.
    #[must_use]
    pub const fn new(
        config: Arc<S>,
        credentials: Arc<K>,
        tracker: ServerStateTracker<R>,
        scheduler: Arc<BackgroundTaskScheduler<F, S>>,
        trigger: Arc<PassTrigger<P>>,
    ) -> Self {
        Self {
            config,
            credentials,
            tracker,
            scheduler,
            trigger,
        }
    }

    /// Turns background monitoring on or off and updates the registration.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Config`] when the settings cannot be saved.
    /// Registration failures are reported in the outcome.
    pub async fn set_monitoring_enabled(&self, enabled: bool) -> ControlResult<ToggleOutcome> {
        let settings = self
            .config
            .set_settings(&SettingsUpdate::new().with_enabled(enabled))
            .await?;
        info!(enabled, "monitoring toggled");
        let result = if enabled {
            self.scheduler.ensure_registered().await
        } else {
            self.scheduler.ensure_unregistered().await
        };
        Ok(ToggleOutcome::with_registration(settings, result))
    }

    /// Turns transition notifications on or off.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Config`] when the settings cannot be saved.
    pub async fn set_notifications_enabled(&self, enabled: bool) -> ControlResult<ToggleOutcome> {
        let settings = self
            .config
            .set_settings(&SettingsUpdate::new().with_notifications_enabled(enabled))
            .await?;
        info!(enabled, "notifications toggled");
        Ok(ToggleOutcome::settings_only(settings))
    }

    /// Changes the check interval, re-registering when monitoring is on.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidInterval`] for values outside
    /// `{5, 15, 30, 60}` and [`ControlError::Config`] when the settings cannot
    /// be saved.
    pub async fn change_check_interval(&self, minutes: u32) -> ControlResult<ToggleOutcome> {
        let interval = CheckInterval::from_minutes(minutes)?;
        let settings = self
            .config
            .set_settings(&SettingsUpdate::new().with_check_interval(interval))
            .await?;
        info!(interval = %interval, "check interval changed");
        if !settings.enabled {
            return Ok(ToggleOutcome::settings_only(settings));
        }
        let result = self.scheduler.reschedule().await;
        Ok(ToggleOutcome::with_registration(settings, result))
    }

    /// Removes the background task and every stored record.
    ///
    /// # Errors
    ///
    /// Returns the first store or registration failure; later steps are not
    /// attempted.
    pub async fn clear_all_data(&self) -> ControlResult<()> {
        self.scheduler.ensure_unregistered().await?;
        self.tracker.clear_all().await?;
        self.config.clear().await?;
        self.credentials.clear().await?;
        info!("all monitoring data cleared");
        Ok(())
    }

    /// Drops the health record of a deleted server.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Tracker`] when the record cannot be removed.
    pub async fn forget_server(&self, server_id: ServerId) -> ControlResult<bool> {
        Ok(self.tracker.forget(server_id).await?)
    }

    /// Runs a manual pass unless one is already running.
    ///
    /// Returns `None` when a pass was already in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Pass`] when the pass could not read its
    /// configuration.
    pub async fn run_now(&self) -> ControlResult<Option<PassSummary>> {
        self.trigger.run_now().await.transpose().map_err(ControlError::from)
    }

    /// Reports settings, registration, and last-known health.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError`] when settings or health state cannot be read.
    pub async fn status(&self) -> ControlResult<MonitoringStatus> {
        Ok(MonitoringStatus {
            settings: self.config.get_settings().await?,
            registration: self.scheduler.state().await,
            servers: self.tracker.all().await?,
        })
    }
}
