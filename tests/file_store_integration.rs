//! End-to-end passes over the file-backed stores.

use std::sync::Arc;

use camino::Utf8PathBuf;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serverwatch::{
    health::{
        adapters::file::FileHealthStateRepository, domain::HealthStatus, ports::HealthStateRepository,
        services::ServerStateTracker,
    },
    inventory::{
        adapters::file::{JsonFileConfigStore, KeyFileCredentialStore},
        domain::{CredentialRef, ServerDefinition, SettingsUpdate},
        ports::{ConfigStore, CredentialStore},
    },
    monitoring::{adapters::recording::RecordingDispatcher, services::MonitoringPassOrchestrator},
    probe::{
        adapters::scripted::{ProbeScript, ScriptedSshTransport},
        services::HealthProber,
    },
    scheduler::{
        adapters::manual::ManualFacility,
        domain::{BackgroundTaskId, RegistrationOutcome},
        ports::{BackgroundExecutionFacility, WakeHandler},
        services::BackgroundTaskScheduler,
    },
    storage::RecordDir,
};
use tempfile::TempDir;

struct DataDir {
    _temp: TempDir,
    root: Utf8PathBuf,
    records: RecordDir,
}

impl DataDir {
    fn config(&self) -> JsonFileConfigStore {
        JsonFileConfigStore::new(self.records.clone())
    }

    fn credentials(&self) -> KeyFileCredentialStore {
        KeyFileCredentialStore::new(self.records.child("credentials").expect("credentials dir"))
    }

    fn health(&self) -> FileHealthStateRepository {
        FileHealthStateRepository::new(self.records.child("health").expect("health dir"))
    }
}

#[fixture]
fn data_dir() -> DataDir {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().join("data")).expect("temp path is UTF-8");
    let records = RecordDir::open(&root).expect("open data dir");
    DataDir {
        _temp: temp,
        root,
        records,
    }
}

fn server(label: &str) -> ServerDefinition {
    let credential = CredentialRef::new(label).expect("valid credential reference");
    ServerDefinition::new(label, format!("{label}.example.com"), "ops", credential)
        .expect("valid definition")
}

async fn seed(data: &DataDir, servers: &[ServerDefinition]) {
    let config = data.config();
    config.put_servers(servers).await.expect("write servers");
    config
        .set_settings(&SettingsUpdate::new().with_enabled(true))
        .await
        .expect("write settings");
    for definition in servers {
        let path = data
            .root
            .join("credentials")
            .join(format!("{}.password", definition.credential_ref().as_str()));
        std::fs::write(path, "pw\n").expect("write password file");
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pass_state_survives_a_restart(data_dir: DataDir) {
    let web = server("web");
    let db = server("db");
    seed(&data_dir, &[web.clone(), db.clone()]).await;
    let transport = Arc::new(ScriptedSshTransport::new());
    transport.set_script(db.id(), ProbeScript::RejectAuth);
    let clock = Arc::new(DefaultClock);
    let orchestrator = MonitoringPassOrchestrator::new(
        Arc::new(data_dir.config()),
        Arc::new(data_dir.credentials()),
        HealthProber::new(Arc::clone(&transport), Arc::clone(&clock)),
        ServerStateTracker::new(Arc::new(data_dir.health())),
        Arc::new(RecordingDispatcher::new()),
        clock,
    );

    let summary = orchestrator.run_pass().await.expect("pass should succeed");
    assert_eq!(summary.outcomes.healthy, 1);
    assert_eq!(summary.outcomes.auth_failed, 1);
    assert_eq!(transport.secret_kinds(), vec!["password", "password"]);

    let reopened = data_dir.health();
    let web_state = reopened
        .find(web.id())
        .await
        .expect("lookup should succeed")
        .expect("web state persisted");
    let db_state = reopened
        .find(db.id())
        .await
        .expect("lookup should succeed")
        .expect("db state persisted");
    assert_eq!(web_state.current_status(), HealthStatus::Healthy);
    assert_eq!(web_state.previous_status(), HealthStatus::Unknown);
    assert_eq!(db_state.current_status(), HealthStatus::AuthFailed);
    assert_eq!(db_state.consecutive_failures(), 1);
    let all = reopened.list_all().await.expect("list should succeed");
    assert_eq!(all.len(), 2);
    assert!(all.contains(&web_state));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cold_start_follows_the_stored_settings(data_dir: DataDir) {
    seed(&data_dir, &[server("web")]).await;
    let facility = Arc::new(ManualFacility::new());
    let config = Arc::new(data_dir.config());
    let handler: Arc<dyn WakeHandler> = Arc::new(NoopHandler);

    let first_boot = BackgroundTaskScheduler::new(Arc::clone(&facility), Arc::clone(&config), Arc::clone(&handler));
    assert_eq!(
        first_boot.start_up().await.expect("start-up should succeed"),
        RegistrationOutcome::Registered
    );

    let second_boot = BackgroundTaskScheduler::new(Arc::clone(&facility), Arc::clone(&config), Arc::clone(&handler));
    assert_eq!(
        second_boot.start_up().await.expect("start-up should succeed"),
        RegistrationOutcome::AlreadyRegistered
    );

    config
        .set_settings(&SettingsUpdate::new().with_enabled(false))
        .await
        .expect("write settings");
    let third_boot = BackgroundTaskScheduler::new(Arc::clone(&facility), config, handler);
    assert_eq!(
        third_boot.start_up().await.expect("start-up should succeed"),
        RegistrationOutcome::Unregistered
    );
    assert!(
        facility
            .registered_interval(&BackgroundTaskId::monitoring())
            .await
            .expect("query should succeed")
            .is_none()
    );
    assert_eq!(facility.register_calls().expect("count"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn clearing_stores_removes_their_files(data_dir: DataDir) {
    let web = server("web");
    seed(&data_dir, &[web.clone()]).await;
    let credentials = data_dir.credentials();
    credentials
        .resolve(web.credential_ref())
        .await
        .expect("password resolves");

    data_dir.config().clear().await.expect("clear config");
    credentials.clear().await.expect("clear credentials");

    assert!(!data_dir.root.join("settings.json").exists());
    assert!(!data_dir.root.join("servers.json").exists());
    assert!(credentials.resolve(web.credential_ref()).await.is_err());
}

struct NoopHandler;

#[async_trait::async_trait]
impl WakeHandler for NoopHandler {
    async fn on_wake(&self) {}
}
