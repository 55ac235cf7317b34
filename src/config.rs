//! Engine configuration loaded from TOML.
//!
//! The file lives at `$XDG_CONFIG_HOME/serverwatch/config.toml` (or
//! `~/.config/serverwatch/config.toml`) unless a path is given. A missing file
//! is created with the defaults, and missing keys fall back to them.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};
use std::env;
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::monitoring::domain::{AlertTemplate, AlertTemplateError, DEFAULT_ALERT_TEMPLATE};
use crate::monitoring::services::PassOptions;
use crate::probe::adapters::openssh::{HostKeyPolicy, OpenSshOptions};
use crate::probe::domain::HealthCommand;

const APP_DIR: &str = "serverwatch";
const CONFIG_FILE: &str = "config.toml";

/// Errors raised while loading or writing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[error("no configuration directory: set XDG_CONFIG_HOME or HOME")]
    PathUnavailable,

    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML for [`EngineConfig`].
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// The configuration could not be encoded.
    #[error("failed to encode configuration: {0}")]
    Encode(#[from] toml::ser::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The alert template does not compile.
    #[error(transparent)]
    Template(#[from] AlertTemplateError),
}

/// Limits and wording for monitoring passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringSection {
    /// Maximum number of probes in flight.
    pub concurrency: usize,
    /// Budget for one probe in seconds.
    pub probe_timeout_secs: u64,
    /// Hard limit for a whole pass in seconds.
    pub pass_deadline_secs: u64,
    /// Budget for handing one alert to the dispatcher in seconds.
    pub notification_timeout_secs: u64,
    /// Budget for recording abandoned servers after cancellation in seconds.
    pub wind_down_secs: u64,
    /// Remote command whose zero exit marks a server healthy.
    pub health_command: HealthCommand,
    /// Alert message template.
    pub alert_template: String,
}

impl Default for MonitoringSection {
    fn default() -> Self {
        let limits = PassOptions::default();
        Self {
            concurrency: limits.concurrency,
            probe_timeout_secs: limits.probe_timeout.as_secs(),
            pass_deadline_secs: limits.pass_deadline.as_secs(),
            notification_timeout_secs: limits.notification_timeout.as_secs(),
            wind_down_secs: limits.wind_down.as_secs(),
            health_command: HealthCommand::default(),
            alert_template: DEFAULT_ALERT_TEMPLATE.to_owned(),
        }
    }
}

/// OpenSSH client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshSection {
    /// The `ssh` executable.
    pub binary: Utf8PathBuf,
    /// `ConnectTimeout` in seconds.
    pub connect_timeout_secs: u64,
    /// Host key checking policy.
    pub host_key_policy: HostKeyPolicy,
    /// Alternative `known_hosts` file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_hosts_file: Option<Utf8PathBuf>,
}

impl Default for SshSection {
    fn default() -> Self {
        let options = OpenSshOptions::default();
        Self {
            binary: options.ssh_binary,
            connect_timeout_secs: options.connect_timeout.as_secs(),
            host_key_policy: options.host_key_policy,
            known_hosts_file: options.known_hosts_file,
        }
    }
}

/// Daemon configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding settings, servers, keys, and health state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<Utf8PathBuf>,
    /// Pass limits and alert wording.
    pub monitoring: MonitoringSection,
    /// OpenSSH client settings.
    pub ssh: SshSection,
}

impl EngineConfig {
    /// Loads the configuration, writing the defaults when the file is absent.
    ///
    /// `path` gets a `.toml` extension when it has none.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the path cannot be resolved, the file
    /// cannot be read or written, or its contents are invalid.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(explicit) => normalize_toml_path(explicit),
            None => default_config_path()?,
        };
        let (dir_path, file_name) = split_path(&config_path)?;
        Dir::create_ambient_dir_all(&dir_path, ambient_authority()).map_err(|source| {
            ConfigError::Write {
                path: config_path.clone(),
                source,
            }
        })?;
        let dir = Dir::open_ambient_dir(&dir_path, ambient_authority()).map_err(|source| {
            ConfigError::Read {
                path: config_path.clone(),
                source,
            }
        })?;

        let config = match dir.read_to_string(&file_name) {
            Ok(raw) => toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: config_path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let defaults = Self::default();
                defaults.write_to(&dir, &file_name, &config_path)?;
                defaults
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: config_path,
                    source,
                });
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when encoding or writing fails.
    pub fn write(&self, path: &Utf8Path) -> Result<(), ConfigError> {
        let (dir_path, file_name) = split_path(path)?;
        let write_error = |source| ConfigError::Write {
            path: path.to_owned(),
            source,
        };
        Dir::create_ambient_dir_all(&dir_path, ambient_authority()).map_err(write_error)?;
        let dir = Dir::open_ambient_dir(&dir_path, ambient_authority()).map_err(write_error)?;
        self.write_to(&dir, &file_name, path)
    }

    fn write_to(&self, dir: &Dir, file_name: &str, path: &Utf8Path) -> Result<(), ConfigError> {
        let encoded = toml::to_string_pretty(self)?;
        dir.write(file_name, encoded).map_err(|source| ConfigError::Write {
            path: path.to_owned(),
            source,
        })
    }

    /// Checks that every limit is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero limits and
    /// [`ConfigError::Template`] for a template that does not compile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let monitoring = &self.monitoring;
        if monitoring.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "monitoring.concurrency must be at least 1".to_owned(),
            ));
        }
        for (key, value) in [
            ("monitoring.probe_timeout_secs", monitoring.probe_timeout_secs),
            ("monitoring.pass_deadline_secs", monitoring.pass_deadline_secs),
            (
                "monitoring.notification_timeout_secs",
                monitoring.notification_timeout_secs,
            ),
            ("monitoring.wind_down_secs", monitoring.wind_down_secs),
            ("ssh.connect_timeout_secs", self.ssh.connect_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{key} must be positive")));
            }
        }
        AlertTemplate::new(monitoring.alert_template.as_str())?;
        Ok(())
    }

    /// Returns the data directory, falling back to
    /// `$XDG_DATA_HOME/serverwatch` or `~/.local/share/serverwatch`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PathUnavailable`] when no directory is
    /// configured and neither variable is set.
    pub fn data_dir(&self) -> Result<Utf8PathBuf, ConfigError> {
        if let Some(configured) = &self.data_dir {
            return Ok(configured.clone());
        }
        base_dir("XDG_DATA_HOME", ".local/share").map(|base| base.join(APP_DIR))
    }

    /// Returns the pass limits.
    #[must_use]
    pub const fn pass_options(&self) -> PassOptions {
        PassOptions {
            concurrency: self.monitoring.concurrency,
            probe_timeout: Duration::from_secs(self.monitoring.probe_timeout_secs),
            pass_deadline: Duration::from_secs(self.monitoring.pass_deadline_secs),
            notification_timeout: Duration::from_secs(self.monitoring.notification_timeout_secs),
            wind_down: Duration::from_secs(self.monitoring.wind_down_secs),
        }
    }

    /// Returns the OpenSSH transport options.
    #[must_use]
    pub fn ssh_options(&self) -> OpenSshOptions {
        OpenSshOptions {
            ssh_binary: self.ssh.binary.clone(),
            connect_timeout: Duration::from_secs(self.ssh.connect_timeout_secs),
            host_key_policy: self.ssh.host_key_policy,
            known_hosts_file: self.ssh.known_hosts_file.clone(),
        }
    }

    /// Compiles the alert template.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Template`] when the template does not compile.
    pub fn alert_template(&self) -> Result<AlertTemplate, ConfigError> {
        Ok(AlertTemplate::new(self.monitoring.alert_template.as_str())?)
    }
}

fn normalize_toml_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut normalized = path.to_owned();
    if normalized.extension() != Some("toml") {
        normalized.set_extension("toml");
    }
    normalized
}

fn default_config_path() -> Result<Utf8PathBuf, ConfigError> {
    base_dir("XDG_CONFIG_HOME", ".config").map(|base| base.join(APP_DIR).join(CONFIG_FILE))
}

fn base_dir(xdg_var: &str, home_fallback: &str) -> Result<Utf8PathBuf, ConfigError> {
    if let Some(xdg) = env::var(xdg_var).ok().filter(|value| !value.is_empty()) {
        return Ok(Utf8PathBuf::from(xdg));
    }
    env::var("HOME")
        .ok()
        .filter(|value| !value.is_empty())
        .map(|home| Utf8PathBuf::from(home).join(home_fallback))
        .ok_or(ConfigError::PathUnavailable)
}

fn split_path(path: &Utf8Path) -> Result<(Utf8PathBuf, String), ConfigError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ConfigError::Invalid(format!("{path} does not name a file")))?;
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    Ok((parent.to_owned(), file_name.to_owned()))
}
