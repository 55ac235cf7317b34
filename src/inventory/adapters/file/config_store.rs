//! JSON-file configuration store.

use async_trait::async_trait;

use crate::inventory::{
    domain::{MonitoringSettings, ServerDefinition, SettingsUpdate},
    ports::{ConfigStore, ConfigStoreError, ConfigStoreResult},
};
use crate::storage::{RecordDir, StorageError};

const SETTINGS_RECORD: &str = "settings.json";
const SERVERS_RECORD: &str = "servers.json";

/// Configuration store backed by `settings.json` and `servers.json`.
///
/// A missing settings file reads as the defaults and a missing server list
/// reads as empty. Settings fields absent from the file also fall back to
/// their defaults, so partially written records stay usable.
#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    records: RecordDir,
}

fn map_storage_error(err: StorageError) -> ConfigStoreError {
    if err.is_decode() {
        ConfigStoreError::invalid_persisted_data(err)
    } else {
        ConfigStoreError::persistence(err)
    }
}

impl JsonFileConfigStore {
    /// Creates a store over an opened record directory.
    #[must_use]
    pub const fn new(records: RecordDir) -> Self {
        Self { records }
    }

    /// Replaces the stored server list.
    ///
    /// The engine never edits servers itself; this exists for the companion
    /// tooling that owns the list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError::Persistence`] when the file cannot be
    /// written.
    pub async fn put_servers(&self, servers: &[ServerDefinition]) -> ConfigStoreResult<()> {
        self.records
            .write(SERVERS_RECORD, servers)
            .await
            .map_err(map_storage_error)
    }

    async fn load_settings(&self) -> ConfigStoreResult<MonitoringSettings> {
        let stored: Option<MonitoringSettings> = self
            .records
            .read(SETTINGS_RECORD)
            .await
            .map_err(map_storage_error)?;
        Ok(stored.unwrap_or_default())
    }
}

#[async_trait]
impl ConfigStore for JsonFileConfigStore {
    async fn get_servers(&self) -> ConfigStoreResult<Vec<ServerDefinition>> {
        let stored: Option<Vec<ServerDefinition>> = self
            .records
            .read(SERVERS_RECORD)
            .await
            .map_err(map_storage_error)?;
        Ok(stored.unwrap_or_default())
    }

    async fn get_settings(&self) -> ConfigStoreResult<MonitoringSettings> {
        self.load_settings().await
    }

    async fn set_settings(&self, update: &SettingsUpdate) -> ConfigStoreResult<MonitoringSettings> {
        let merged = update.apply_to(self.load_settings().await?);
        self.records
            .write(SETTINGS_RECORD, &merged)
            .await
            .map_err(map_storage_error)?;
        Ok(merged)
    }

    async fn clear(&self) -> ConfigStoreResult<()> {
        for record in [SETTINGS_RECORD, SERVERS_RECORD] {
            self.records
                .remove(record)
                .await
                .map_err(map_storage_error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::domain::{CheckInterval, CredentialRef};
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};

    struct TempStore {
        _temp: tempfile::TempDir,
        records: RecordDir,
        store: JsonFileConfigStore,
    }

    #[fixture]
    fn temp_store() -> TempStore {
        let temp = tempfile::tempdir().expect("temporary directory should be created");
        let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("temporary path should be UTF-8");
        let records = RecordDir::open(&path).expect("record directory should open");
        let store = JsonFileConfigStore::new(records.clone());
        TempStore {
            _temp: temp,
            records,
            store,
        }
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn missing_files_read_as_defaults(temp_store: TempStore) {
        let settings = temp_store.store.get_settings().await.expect("settings should load");
        let servers = temp_store.store.get_servers().await.expect("servers should load");

        assert_eq!(settings, MonitoringSettings::default());
        assert!(servers.is_empty());
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn partial_settings_record_keeps_other_defaults(temp_store: TempStore) {
        temp_store
            .records
            .write(SETTINGS_RECORD, &serde_json::json!({ "monitoringEnabled": true }))
            .await
            .expect("seed write should succeed");

        let settings = temp_store.store.get_settings().await.expect("settings should load");

        assert!(settings.enabled);
        assert!(settings.notifications_enabled);
        assert_eq!(settings.check_interval, CheckInterval::FifteenMinutes);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn set_settings_merges_and_persists(temp_store: TempStore) {
        temp_store
            .store
            .set_settings(&SettingsUpdate::new().with_enabled(true))
            .await
            .expect("first update should succeed");
        let merged = temp_store
            .store
            .set_settings(&SettingsUpdate::new().with_check_interval(CheckInterval::FiveMinutes))
            .await
            .expect("second update should succeed");

        let reloaded = JsonFileConfigStore::new(temp_store.records.clone())
            .get_settings()
            .await
            .expect("settings should reload");
        assert!(merged.enabled);
        assert_eq!(merged, reloaded);
        assert_eq!(reloaded.check_interval, CheckInterval::FiveMinutes);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn unsupported_interval_on_disk_is_invalid_data(temp_store: TempStore) {
        temp_store
            .records
            .write(SETTINGS_RECORD, &serde_json::json!({ "checkInterval": 7 }))
            .await
            .expect("seed write should succeed");

        let result = temp_store.store.get_settings().await;

        assert!(matches!(result, Err(ConfigStoreError::InvalidPersistedData(_))));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn clear_removes_settings_and_servers(temp_store: TempStore) {
        let credential = CredentialRef::new("web").expect("valid credential reference");
        let server = ServerDefinition::new("web", "web.example.com", "deploy", credential)
            .expect("valid definition");
        temp_store
            .store
            .put_servers(std::slice::from_ref(&server))
            .await
            .expect("servers should be written");
        temp_store
            .store
            .set_settings(&SettingsUpdate::new().with_enabled(true))
            .await
            .expect("settings should be written");
        assert_eq!(
            temp_store.store.get_servers().await.expect("servers should load"),
            vec![server]
        );

        temp_store.store.clear().await.expect("clear should succeed");

        assert!(temp_store.store.get_servers().await.expect("servers should load").is_empty());
        assert!(!temp_store.store.get_settings().await.expect("settings should load").enabled);
    }
}
