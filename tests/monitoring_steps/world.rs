//! Shared world state for monitoring BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use rstest::fixture;
use serverwatch::{
    health::{adapters::memory::InMemoryHealthStateRepository, services::ServerStateTracker},
    inventory::{
        adapters::memory::{InMemoryConfigStore, InMemoryCredentialStore},
        domain::{CredentialRef, Secret, ServerDefinition},
    },
    monitoring::{
        adapters::recording::RecordingDispatcher,
        domain::PassSummary,
        services::{MonitoringControl, MonitoringPassOrchestrator, PassOptions, PassTrigger},
    },
    probe::{adapters::scripted::ScriptedSshTransport, services::HealthProber},
    scheduler::{adapters::manual::ManualFacility, ports::WakeHandler, services::BackgroundTaskScheduler},
};

/// Orchestrator type used by the BDD world.
pub type TestOrchestrator = MonitoringPassOrchestrator<
    InMemoryConfigStore,
    InMemoryCredentialStore,
    ScriptedSshTransport,
    InMemoryHealthStateRepository,
    RecordingDispatcher,
    DefaultClock,
>;

/// Control surface type used by the BDD world.
pub type TestControl = MonitoringControl<
    InMemoryConfigStore,
    InMemoryCredentialStore,
    InMemoryHealthStateRepository,
    ManualFacility,
    TestOrchestrator,
>;

/// Scenario world for monitoring behaviour tests.
pub struct MonitoringWorld {
    /// Settings and server list.
    pub config: Arc<InMemoryConfigStore>,
    /// Secrets by credential reference.
    pub credentials: Arc<InMemoryCredentialStore>,
    /// Scripted SSH transport.
    pub transport: Arc<ScriptedSshTransport>,
    /// Persisted health state.
    pub repository: Arc<InMemoryHealthStateRepository>,
    /// Alerts handed out.
    pub dispatcher: Arc<RecordingDispatcher>,
    /// Host facility fired by hand.
    pub facility: Arc<ManualFacility>,
    /// Tracker over the repository.
    pub tracker: ServerStateTracker<InMemoryHealthStateRepository>,
    /// Toggle surface under test.
    pub control: TestControl,
    /// Servers added by label.
    pub servers: HashMap<String, ServerDefinition>,
    /// Summary of the most recent pass.
    pub last_summary: Option<PassSummary>,
    /// Alerts recorded before the most recent pass.
    pub alerts_before_last_pass: usize,
}

impl MonitoringWorld {
    /// Creates a world with monitoring disabled and no servers.
    #[must_use]
    pub fn new() -> Self {
        let config = Arc::new(InMemoryConfigStore::new());
        let credentials = Arc::new(InMemoryCredentialStore::new());
        let transport = Arc::new(ScriptedSshTransport::new());
        let repository = Arc::new(InMemoryHealthStateRepository::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let facility = Arc::new(ManualFacility::new());
        let clock = Arc::new(DefaultClock);
        let tracker = ServerStateTracker::new(Arc::clone(&repository));

        let orchestrator = MonitoringPassOrchestrator::new(
            Arc::clone(&config),
            Arc::clone(&credentials),
            HealthProber::new(Arc::clone(&transport), Arc::clone(&clock)),
            tracker.clone(),
            Arc::clone(&dispatcher),
            clock,
        )
        .with_options(PassOptions {
            probe_timeout: Duration::from_millis(300),
            pass_deadline: Duration::from_millis(600),
            ..PassOptions::default()
        });
        let trigger = Arc::new(PassTrigger::new(Arc::new(orchestrator)));
        let scheduler = Arc::new(BackgroundTaskScheduler::new(
            Arc::clone(&facility),
            Arc::clone(&config),
            Arc::clone(&trigger) as Arc<dyn WakeHandler>,
        ));
        let control = MonitoringControl::new(
            Arc::clone(&config),
            Arc::clone(&credentials),
            tracker.clone(),
            scheduler,
            trigger,
        );
        Self {
            config,
            credentials,
            transport,
            repository,
            dispatcher,
            facility,
            tracker,
            control,
            servers: HashMap::new(),
            last_summary: None,
            alerts_before_last_pass: 0,
        }
    }

    /// Adds a monitored server, optionally with a password credential.
    ///
    /// # Errors
    ///
    /// Returns an error when the definition is invalid or a store rejects it.
    pub fn add_server(&mut self, label: &str, with_secret: bool) -> Result<ServerDefinition, eyre::Report> {
        let credential = CredentialRef::new(label)?;
        let server = ServerDefinition::new(label, format!("{label}.example.com"), "ops", credential.clone())?;
        self.config.insert_server(server.clone())?;
        if with_secret {
            self.credentials.insert(credential, Secret::password("pw"))?;
        }
        self.servers.insert(label.to_owned(), server.clone());
        Ok(server)
    }

    /// Looks up a server added earlier.
    ///
    /// # Errors
    ///
    /// Returns an error when no server has that label.
    pub fn server(&self, label: &str) -> Result<&ServerDefinition, eyre::Report> {
        self.servers
            .get(label)
            .ok_or_else(|| eyre::eyre!("no server labelled '{label}' in scenario world"))
    }
}

impl Default for MonitoringWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> MonitoringWorld {
    MonitoringWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
