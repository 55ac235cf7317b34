//! Runs the monitoring engine and its one-shot controls.
//!
//! Usage:
//!
//! ```text
//! serverwatch [--config <path>] <command>
//! ```
//!
//! `run` starts the daemon: it reconciles the background registration with
//! the stored settings, runs a pass on every interval tick, reconciles again
//! on `SIGHUP`, and stops on `SIGINT`/`SIGTERM` after cancelling the running
//! pass. The other commands act once and exit. Results are reported through
//! the log; set `RUST_LOG_FORMAT=json` for machine-readable output.
//!
//! Settings and servers are read from `<data-dir>/settings.json` and
//! `<data-dir>/servers.json`, credentials from `<data-dir>/credentials/`, and
//! health state is kept in `<data-dir>/health/`.

#[cfg(unix)]
use camino::Utf8PathBuf;
#[cfg(unix)]
use clap::{Parser, Subcommand};
#[cfg(unix)]
use mockable::DefaultClock;
#[cfg(unix)]
use serverwatch::{
    config::{ConfigError, EngineConfig},
    health::{adapters::file::FileHealthStateRepository, services::ServerStateTracker},
    inventory::{
        adapters::file::{JsonFileConfigStore, KeyFileCredentialStore},
        domain::ServerId,
    },
    monitoring::{
        adapters::log::TracingDispatcher,
        domain::PassSummary,
        services::{ControlError, MonitoringControl, MonitoringPassOrchestrator, PassTrigger, ToggleOutcome},
    },
    probe::{adapters::openssh::OpenSshTransport, services::HealthProber},
    scheduler::{
        adapters::interval::TokioIntervalFacility,
        ports::WakeHandler,
        services::{BackgroundTaskScheduler, SchedulerError},
    },
    storage::{RecordDir, StorageError},
    telemetry,
};
#[cfg(unix)]
use std::sync::Arc;
#[cfg(unix)]
use thiserror::Error;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
#[cfg(unix)]
use tracing::{info, warn};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
type Orchestrator = MonitoringPassOrchestrator<
    JsonFileConfigStore,
    KeyFileCredentialStore,
    OpenSshTransport,
    FileHealthStateRepository,
    TracingDispatcher,
    DefaultClock,
>;

#[cfg(unix)]
type Control = MonitoringControl<
    JsonFileConfigStore,
    KeyFileCredentialStore,
    FileHealthStateRepository,
    TokioIntervalFacility,
    Orchestrator,
>;

/// Errors that stop the command.
#[cfg(unix)]
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open data directory: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error("invalid server id '{0}'")]
    InvalidServerId(String),
    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),
}

#[cfg(unix)]
#[derive(Debug, Parser)]
#[command(name = "serverwatch", version, about = "Background health monitoring for SSH servers")]
struct Cli {
    /// Configuration file; defaults to `$XDG_CONFIG_HOME/serverwatch/config.toml`.
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[cfg(unix)]
#[derive(Debug, Subcommand)]
enum Command {
    /// Run the monitoring daemon.
    Run,
    /// Run one monitoring pass now.
    Check,
    /// Turn background monitoring on.
    Enable,
    /// Turn background monitoring off.
    Disable,
    /// Turn transition notifications on or off.
    Notifications {
        /// `on` or `off`.
        #[arg(value_parser = parse_switch)]
        enabled: bool,
    },
    /// Change the check interval (5, 15, 30, or 60 minutes).
    Interval {
        /// Minutes between passes.
        minutes: u32,
    },
    /// Forget the health record of a deleted server.
    Forget {
        /// Server identifier.
        server_id: String,
    },
    /// Delete all settings, servers, credentials, and health state.
    Clear,
    /// Report settings and last-known health.
    Status,
}

#[cfg(unix)]
fn parse_switch(value: &str) -> Result<bool, String> {
    match value {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(format!("expected on or off, got '{other}'")),
    }
}

/// Everything a command needs, wired over the file stores.
#[cfg(unix)]
struct Engine {
    control: Control,
    scheduler: Arc<BackgroundTaskScheduler<TokioIntervalFacility, JsonFileConfigStore>>,
    trigger: Arc<PassTrigger<Orchestrator>>,
}

#[cfg(unix)]
fn build_engine(config: &EngineConfig) -> Result<Engine, CliError> {
    let data = RecordDir::open(&config.data_dir()?)?;
    let config_store = Arc::new(JsonFileConfigStore::new(data.clone()));
    let credentials = Arc::new(KeyFileCredentialStore::new(data.child("credentials")?));
    let tracker = ServerStateTracker::new(Arc::new(FileHealthStateRepository::new(
        data.child("health")?,
    )));
    let clock = Arc::new(DefaultClock);
    let transport = Arc::new(OpenSshTransport::new(config.ssh_options()));
    let prober = HealthProber::with_command(
        transport,
        Arc::clone(&clock),
        config.monitoring.health_command.clone(),
    );

    let orchestrator = MonitoringPassOrchestrator::new(
        Arc::clone(&config_store),
        Arc::clone(&credentials),
        prober,
        tracker.clone(),
        Arc::new(TracingDispatcher::new()),
        clock,
    )
    .with_options(config.pass_options())
    .with_template(config.alert_template()?);

    let trigger = Arc::new(PassTrigger::new(Arc::new(orchestrator)));
    let scheduler = Arc::new(BackgroundTaskScheduler::new(
        Arc::new(TokioIntervalFacility::new()),
        Arc::clone(&config_store),
        Arc::clone(&trigger) as Arc<dyn WakeHandler>,
    ));
    let control = MonitoringControl::new(
        config_store,
        credentials,
        tracker,
        Arc::clone(&scheduler),
        Arc::clone(&trigger),
    );
    Ok(Engine {
        control,
        scheduler,
        trigger,
    })
}

#[cfg(unix)]
#[tokio::main]
async fn main() -> Result<(), BoxError> {
    telemetry::init();
    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref())?;
    let engine = build_engine(&config)?;
    run_command(&engine, cli.command).await.map_err(Into::into)
}

#[cfg(unix)]
async fn run_command(engine: &Engine, command: Command) -> Result<(), CliError> {
    match command {
        Command::Run => run_daemon(engine).await,
        Command::Check => {
            match engine.control.run_now().await? {
                Some(summary) => report_pass(&summary),
                None => warn!("a monitoring pass is already running"),
            }
            Ok(())
        }
        Command::Enable => {
            report_toggle(&engine.control.set_monitoring_enabled(true).await?);
            Ok(())
        }
        Command::Disable => {
            report_toggle(&engine.control.set_monitoring_enabled(false).await?);
            Ok(())
        }
        Command::Notifications { enabled } => {
            report_toggle(&engine.control.set_notifications_enabled(enabled).await?);
            Ok(())
        }
        Command::Interval { minutes } => {
            report_toggle(&engine.control.change_check_interval(minutes).await?);
            Ok(())
        }
        Command::Forget { server_id } => {
            let uuid = uuid::Uuid::parse_str(&server_id)
                .map_err(|_| CliError::InvalidServerId(server_id.clone()))?;
            let removed = engine.control.forget_server(ServerId::from_uuid(uuid)).await?;
            info!(server_id = %uuid, removed, "health record forgotten");
            Ok(())
        }
        Command::Clear => {
            engine.control.clear_all_data().await?;
            Ok(())
        }
        Command::Status => {
            let status = engine.control.status().await?;
            info!(
                enabled = status.settings.enabled,
                interval = %status.settings.check_interval,
                notifications = status.settings.notifications_enabled,
                registration = %status.registration,
                "monitoring settings"
            );
            for state in &status.servers {
                info!(
                    server_id = %state.server_id(),
                    status = %state.current_status(),
                    previous = %state.previous_status(),
                    consecutive_failures = state.consecutive_failures(),
                    latency_ms = state.last_latency_ms(),
                    last_checked_at = ?state.last_checked_at(),
                    "server health"
                );
            }
            Ok(())
        }
    }
}

#[cfg(unix)]
async fn run_daemon(engine: &Engine) -> Result<(), CliError> {
    let mut hangup = signal(SignalKind::hangup()).map_err(CliError::Signal)?;
    let mut terminate = signal(SignalKind::terminate()).map_err(CliError::Signal)?;
    let outcome = engine.scheduler.start_up().await?;
    info!(?outcome, "serverwatch daemon started");

    loop {
        tokio::select! {
            _ = hangup.recv() => {
                match engine.scheduler.start_up().await {
                    Ok(reconciled) => info!(outcome = ?reconciled, "registration reloaded"),
                    Err(err) => warn!(error = %err, "registration reload failed"),
                }
            }
            _ = terminate.recv() => break,
            signalled = tokio::signal::ctrl_c() => {
                signalled.map_err(CliError::Signal)?;
                break;
            }
        }
    }

    info!("shutting down");
    engine.trigger.shutdown();
    engine.trigger.wait_idle().await;
    info!(
        skipped_wake_ups = engine.trigger.skipped_requests(),
        "serverwatch daemon stopped"
    );
    Ok(())
}

#[cfg(unix)]
fn report_pass(summary: &PassSummary) {
    if summary.skipped_disabled {
        warn!("monitoring is disabled; enable it to run passes");
        return;
    }
    for event in &summary.transitions {
        info!(
            server_id = %event.server_id,
            from = %event.from,
            to = %event.to,
            "transition"
        );
    }
}

#[cfg(unix)]
fn report_toggle(outcome: &ToggleOutcome) {
    info!(
        enabled = outcome.settings.enabled,
        interval = %outcome.settings.check_interval,
        notifications = outcome.settings.notifications_enabled,
        "settings saved; send SIGHUP to a running daemon to apply them"
    );
    if let Some(warning) = &outcome.warning {
        warn!(%warning, "background registration needs a retry");
    }
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("serverwatch requires a Unix host with OpenSSH".into())
}
