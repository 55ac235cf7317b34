//! Tracing subscriber set-up.
//!
//! `RUST_LOG` selects what is emitted (default `info`) and
//! `RUST_LOG_FORMAT=json` switches from compact lines to JSON objects.

use std::env;

use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::{
    Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Output format of log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One compact line per event.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a `RUST_LOG_FORMAT` value; anything but `json` is compact.
    #[must_use]
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Compact
        }
    }
}

/// Installs the global subscriber at `info` unless `RUST_LOG` says otherwise.
///
/// Calling it again after a subscriber is installed only logs a warning.
pub fn init() {
    init_with_level(LevelFilter::INFO);
}

/// Installs the global subscriber with a custom default level.
pub fn init_with_level(level: LevelFilter) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let format = env::var("RUST_LOG_FORMAT")
        .map(|value| LogFormat::from_env_value(&value))
        .unwrap_or_default();

    let layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_filter(env_filter)
            .boxed(),
    };

    if let Err(err) = tracing_subscriber::registry().with(layer).try_init() {
        warn!(error = %err, "tracing subscriber already installed");
    }
}
