//! One monitoring pass over every monitored server.

use crate::health::{
    domain::{HealthCheckResult, TransitionEvent},
    ports::HealthStateRepository,
    services::ServerStateTracker,
};
use crate::inventory::{
    domain::{MonitoringSettings, ServerDefinition, ServerId},
    ports::{ConfigStore, ConfigStoreError, CredentialStore},
};
use crate::monitoring::{
    domain::{AlertRequest, AlertTemplate, PassSummary},
    ports::NotificationDispatcher,
};
use crate::probe::{ports::SshTransport, services::HealthProber};
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt, stream};
use mockable::Clock;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, warn};

use super::trigger::PassRunner;

/// Errors that abort a pass.
#[derive(Debug, Error)]
pub enum PassError {
    /// Settings or the server list could not be read.
    #[error("could not read monitoring configuration: {0}")]
    ConfigRead(#[from] ConfigStoreError),
}

/// Result type for pass operations.
pub type PassResult<T> = Result<T, PassError>;

/// Limits applied to every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOptions {
    /// Maximum number of probes in flight.
    pub concurrency: usize,
    /// Budget for one probe, from connect to command response.
    pub probe_timeout: Duration,
    /// Hard limit for the whole pass; probes still running are abandoned.
    pub pass_deadline: Duration,
    /// Budget for handing one alert to the dispatcher.
    pub notification_timeout: Duration,
    /// Budget for recording abandoned servers once the pass is cancelled.
    pub wind_down: Duration,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            concurrency: 3,
            probe_timeout: Duration::from_secs(10),
            pass_deadline: Duration::from_secs(45),
            notification_timeout: Duration::from_secs(2),
            wind_down: Duration::from_secs(1),
        }
    }
}

/// Result of checking one server.
struct Checked<'a> {
    server: &'a ServerDefinition,
    result: HealthCheckResult,
    /// False when the deadline passed before anything was asked of the server.
    attempted: bool,
}

impl<'a> Checked<'a> {
    const fn attempted(server: &'a ServerDefinition, result: HealthCheckResult) -> Self {
        Self {
            server,
            result,
            attempted: true,
        }
    }

    const fn skipped(server: &'a ServerDefinition, result: HealthCheckResult) -> Self {
        Self {
            server,
            result,
            attempted: false,
        }
    }
}

/// Runs monitoring passes.
///
/// Results are committed one at a time as probes finish, so a committed
/// result survives cancellation of the rest of the pass. No server is probed
/// twice in one pass. Alerts are delivered alongside the probes, never in
/// front of them.
pub struct MonitoringPassOrchestrator<S, K, T, R, D, C>
where
    S: ConfigStore,
    K: CredentialStore,
    T: SshTransport,
    R: HealthStateRepository,
    D: NotificationDispatcher,
    C: Clock + Send + Sync,
{
    config: Arc<S>,
    credentials: Arc<K>,
    prober: HealthProber<T, C>,
    tracker: ServerStateTracker<R>,
    dispatcher: Arc<D>,
    clock: Arc<C>,
    template: AlertTemplate,
    options: PassOptions,
}

impl<S, K, T, R, D, C> MonitoringPassOrchestrator<S, K, T, R, D, C>
where
    S: ConfigStore,
    K: CredentialStore,
    T: SshTransport,
    R: HealthStateRepository,
    D: NotificationDispatcher,
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator with default limits and alert wording.
    #[must_use]
    pub fn new(
        config: Arc<S>,
        credentials: Arc<K>,
        prober: HealthProber<T, C>,
        tracker: ServerStateTracker<R>,
        dispatcher: Arc<D>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            config,
            credentials,
            prober,
            tracker,
            dispatcher,
            clock,
            template: AlertTemplate::default(),
            options: PassOptions::default(),
        }
    }

    /// Replaces the pass limits.
    #[must_use]
    pub const fn with_options(mut self, options: PassOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the alert template.
    #[must_use]
    pub fn with_template(mut self, template: AlertTemplate) -> Self {
        self.template = template;
        self
    }

    /// Returns the pass limits.
    #[must_use]
    pub const fn options(&self) -> &PassOptions {
        &self.options
    }

    /// Runs one pass to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PassError::ConfigRead`] when settings or the server list
    /// cannot be read. Nothing else fails the pass.
    pub async fn run_pass(&self) -> PassResult<PassSummary> {
        self.run_pass_until(std::future::pending()).await
    }

    /// Runs one pass, stopping early when `cancel` resolves.
    ///
    /// On cancellation the probes in flight are dropped, which releases their
    /// connections, and pending alerts are abandoned. Every server without a
    /// committed result is then recorded as `Timeout` within
    /// [`PassOptions::wind_down`]; those records raise no alerts. Results
    /// committed before cancellation stay.
    ///
    /// # Errors
    ///
    /// Returns [`PassError::ConfigRead`] when settings or the server list
    /// cannot be read.
    pub async fn run_pass_until<F>(&self, cancel: F) -> PassResult<PassSummary>
    where
        F: Future<Output = ()> + Send,
    {
        let started_at = self.clock.utc();
        let settings = self.config.get_settings().await?;
        if !settings.enabled {
            debug!("monitoring disabled; pass skipped");
            return Ok(PassSummary::disabled(started_at));
        }
        let servers = monitored_servers(self.config.get_servers().await?);
        let mut summary = PassSummary::started(started_at);

        tokio::pin!(cancel);
        let committed = self
            .fan_out(&servers, &settings, cancel, &mut summary)
            .await;
        if summary.cancelled {
            self.record_abandoned(&servers, &committed, &mut summary)
                .await;
        }

        summary.finished_at = self.clock.utc();
        info!(
            servers = summary.servers_checked(),
            healthy = summary.outcomes.healthy,
            transitions = summary.transitions.len(),
            notifications = summary.notifications_requested,
            persist_failures = summary.persist_failures,
            cancelled = summary.cancelled,
            "monitoring pass finished"
        );
        Ok(summary)
    }

    /// Probes every server and delivers alerts until both are done or
    /// `cancel` resolves. Returns the servers whose result was committed.
    async fn fan_out<F>(
        &self,
        servers: &[ServerDefinition],
        settings: &MonitoringSettings,
        mut cancel: Pin<&mut F>,
        summary: &mut PassSummary,
    ) -> HashSet<ServerId>
    where
        F: Future<Output = ()> + Send,
    {
        let deadline = Instant::now() + self.options.pass_deadline;
        let mut committed = HashSet::with_capacity(servers.len());
        let mut alerts: FuturesUnordered<BoxFuture<'_, bool>> = FuturesUnordered::new();
        let checks: Vec<_> = servers
            .iter()
            .map(|server| self.check_server(server, deadline))
            .collect();
        let mut probes = stream::iter(checks)
            .buffer_unordered(self.options.concurrency.max(1));
        let mut probes_done = false;

        while !probes_done || !alerts.is_empty() {
            tokio::select! {
                biased;
                () = &mut cancel => {
                    summary.cancelled = true;
                    break;
                }
                Some(delivered) = alerts.next(), if !alerts.is_empty() => {
                    if !delivered {
                        summary.notifications_failed += 1;
                    }
                }
                next = probes.next(), if !probes_done => {
                    let Some(checked) = next else {
                        probes_done = true;
                        continue;
                    };
                    committed.insert(checked.server.id());
                    let recorded = tokio::select! {
                        biased;
                        () = &mut cancel => None,
                        event = self.record(checked.server, &checked.result, summary) => Some(event),
                    };
                    match recorded {
                        None => {
                            summary.cancelled = true;
                            summary.persist_failures += 1;
                            warn!(server_id = %checked.server.id(), "health state write abandoned");
                            break;
                        }
                        Some(Some(event)) if settings.notifications_enabled && checked.attempted => {
                            summary.notifications_requested += 1;
                            alerts.push(self.deliver(checked.server, event).boxed());
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        if !alerts.is_empty() {
            summary.notifications_failed += alerts.len();
            warn!(pending = alerts.len(), "pass cancelled with alerts undelivered");
        }
        committed
    }

    async fn check_server<'a>(
        &self,
        server: &'a ServerDefinition,
        deadline: Instant,
    ) -> Checked<'a> {
        let resolved = timeout_at(
            deadline,
            self.credentials.resolve(server.credential_ref()),
        )
        .await;
        let secret = match resolved {
            Ok(Ok(secret)) => secret,
            Ok(Err(err)) => {
                let result = HealthCheckResult::auth_failed(self.clock.utc())
                    .with_detail(format!("credential unavailable: {err}"));
                return Checked::attempted(server, result);
            }
            Err(_) => {
                let result = HealthCheckResult::timed_out(self.clock.utc())
                    .with_detail("pass deadline reached while resolving credentials");
                return Checked::skipped(server, result);
            }
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        let budget = self.options.probe_timeout.min(remaining);
        if budget.is_zero() {
            let result = HealthCheckResult::timed_out(self.clock.utc())
                .with_detail("pass deadline reached before the probe started");
            return Checked::skipped(server, result);
        }
        let probed = timeout_at(deadline, self.prober.probe(server, &secret, budget)).await;
        let result = probed.unwrap_or_else(|_| {
            HealthCheckResult::timed_out(self.clock.utc()).with_detail("pass deadline reached")
        });
        Checked::attempted(server, result)
    }

    /// Records `Timeout` for every server without a committed result.
    async fn record_abandoned(
        &self,
        servers: &[ServerDefinition],
        committed: &HashSet<ServerId>,
        summary: &mut PassSummary,
    ) {
        let abandoned: Vec<&ServerDefinition> = servers
            .iter()
            .filter(|server| !committed.contains(&server.id()))
            .collect();
        if abandoned.is_empty() {
            return;
        }

        let mut recorded = 0_usize;
        let finished = timeout(self.options.wind_down, async {
            for server in &abandoned {
                let result = HealthCheckResult::timed_out(self.clock.utc())
                    .with_detail("pass cancelled before the probe finished");
                self.record(server, &result, summary).await;
                recorded += 1;
            }
        })
        .await;
        if finished.is_err() {
            let unrecorded = abandoned.len().saturating_sub(recorded);
            summary.persist_failures += unrecorded;
            warn!(unrecorded, "wind-down budget spent; abandoned servers left unrecorded");
        }
    }

    /// Commits one result, returning the transition it caused.
    async fn record(
        &self,
        server: &ServerDefinition,
        result: &HealthCheckResult,
        summary: &mut PassSummary,
    ) -> Option<TransitionEvent> {
        summary.outcomes.record(result.status());
        debug!(
            server_id = %server.id(),
            status = %result.status(),
            latency_ms = result.latency_ms(),
            detail = result.detail(),
            "probe finished"
        );

        match self.tracker.apply_result(server.id(), result).await {
            Ok(event) => {
                summary.transitions.extend(event);
                event
            }
            Err(err) => {
                summary.persist_failures += 1;
                warn!(server_id = %server.id(), error = %err, "health state not persisted");
                None
            }
        }
    }

    /// Hands one alert to the dispatcher, returning whether it was accepted.
    async fn deliver(&self, server: &ServerDefinition, event: TransitionEvent) -> bool {
        let draft = AlertRequest::for_transition(server, &event);
        let message = self.template.render(&draft);
        let alert = draft.with_message(message);

        let delivered = timeout(
            self.options.notification_timeout,
            self.dispatcher.request_alert(&alert),
        )
        .await;
        match delivered {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(server_id = %server.id(), error = %err, "alert not delivered");
                false
            }
            Err(_) => {
                warn!(server_id = %server.id(), "alert delivery timed out");
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl<S, K, T, R, D, C> PassRunner for MonitoringPassOrchestrator<S, K, T, R, D, C>
where
    S: ConfigStore,
    K: CredentialStore,
    T: SshTransport,
    R: HealthStateRepository,
    D: NotificationDispatcher,
    C: Clock + Send + Sync,
{
    async fn run_until(&self, cancel: BoxFuture<'static, ()>) -> PassResult<PassSummary> {
        self.run_pass_until(cancel).await
    }
}

/// Keeps monitored servers, dropping repeated identifiers.
fn monitored_servers(servers: Vec<ServerDefinition>) -> Vec<ServerDefinition> {
    let mut seen = HashSet::with_capacity(servers.len());
    servers
        .into_iter()
        .filter(|server| server.is_monitored())
        .filter(|server| seen.insert(server.id()))
        .collect()
}
