//! Monitoring settings and the supported check intervals.

use super::InventoryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Supported periods between background health checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum CheckInterval {
    /// Every five minutes.
    FiveMinutes,
    /// Every fifteen minutes.
    #[default]
    FifteenMinutes,
    /// Every thirty minutes.
    ThirtyMinutes,
    /// Every hour.
    SixtyMinutes,
}

impl CheckInterval {
    /// All supported intervals in ascending order.
    pub const ALL: [Self; 4] = [
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::SixtyMinutes,
    ];

    /// Parses an interval from its length in minutes.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryDomainError::UnsupportedCheckInterval`] for values
    /// outside `{5, 15, 30, 60}`.
    pub const fn from_minutes(minutes: u32) -> Result<Self, InventoryDomainError> {
        match minutes {
            5 => Ok(Self::FiveMinutes),
            15 => Ok(Self::FifteenMinutes),
            30 => Ok(Self::ThirtyMinutes),
            60 => Ok(Self::SixtyMinutes),
            other => Err(InventoryDomainError::UnsupportedCheckInterval(other)),
        }
    }

    /// Returns the interval length in minutes.
    #[must_use]
    pub const fn minutes(self) -> u32 {
        match self {
            Self::FiveMinutes => 5,
            Self::FifteenMinutes => 15,
            Self::ThirtyMinutes => 30,
            Self::SixtyMinutes => 60,
        }
    }

    /// Returns the interval as a duration.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.minutes()) * 60)
    }
}

impl TryFrom<u32> for CheckInterval {
    type Error = InventoryDomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_minutes(value)
    }
}

impl From<CheckInterval> for u32 {
    fn from(value: CheckInterval) -> Self {
        value.minutes()
    }
}

impl fmt::Display for CheckInterval {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}m", self.minutes())
    }
}

/// User-controlled monitoring settings.
///
/// The serialized field names match the settings record written by the
/// companion app, and missing fields fall back to the same defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringSettings {
    /// Whether background monitoring runs at all.
    #[serde(rename = "monitoringEnabled", default)]
    pub enabled: bool,
    /// Minimum period between background passes.
    #[serde(rename = "checkInterval", default)]
    pub check_interval: CheckInterval,
    /// Whether transitions raise notifications.
    #[serde(rename = "notificationsEnabled", default = "default_notifications")]
    pub notifications_enabled: bool,
}

const fn default_notifications() -> bool {
    true
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            check_interval: CheckInterval::default(),
            notifications_enabled: true,
        }
    }
}

/// Partial settings update; unset fields keep their stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    enabled: Option<bool>,
    check_interval: Option<CheckInterval>,
    notifications_enabled: Option<bool>,
}

impl SettingsUpdate {
    /// Creates an empty update.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: None,
            check_interval: None,
            notifications_enabled: None,
        }
    }

    /// Sets the monitoring toggle.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Sets the check interval.
    #[must_use]
    pub const fn with_check_interval(mut self, interval: CheckInterval) -> Self {
        self.check_interval = Some(interval);
        self
    }

    /// Sets the notifications toggle.
    #[must_use]
    pub const fn with_notifications_enabled(mut self, enabled: bool) -> Self {
        self.notifications_enabled = Some(enabled);
        self
    }

    /// Returns `settings` with this update merged over it.
    #[must_use]
    pub fn apply_to(self, settings: MonitoringSettings) -> MonitoringSettings {
        MonitoringSettings {
            enabled: self.enabled.unwrap_or(settings.enabled),
            check_interval: self.check_interval.unwrap_or(settings.check_interval),
            notifications_enabled: self
                .notifications_enabled
                .unwrap_or(settings.notifications_enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(5, CheckInterval::FiveMinutes)]
    #[case(15, CheckInterval::FifteenMinutes)]
    #[case(30, CheckInterval::ThirtyMinutes)]
    #[case(60, CheckInterval::SixtyMinutes)]
    fn supported_intervals_parse(#[case] minutes: u32, #[case] expected: CheckInterval) {
        assert_eq!(CheckInterval::from_minutes(minutes), Ok(expected));
        assert_eq!(expected.as_duration(), Duration::from_secs(u64::from(minutes) * 60));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(10)]
    #[case(120)]
    fn unsupported_intervals_are_rejected(#[case] minutes: u32) {
        assert_eq!(
            CheckInterval::from_minutes(minutes),
            Err(InventoryDomainError::UnsupportedCheckInterval(minutes))
        );
    }

    #[test]
    fn settings_default_to_disabled_with_notifications() {
        let settings: MonitoringSettings =
            serde_json::from_str("{}").expect("empty record should parse");
        assert_eq!(settings, MonitoringSettings::default());
        assert!(!settings.enabled);
        assert!(settings.notifications_enabled);
        assert_eq!(settings.check_interval, CheckInterval::FifteenMinutes);
    }

    #[test]
    fn settings_use_companion_app_field_names() {
        let settings: MonitoringSettings = serde_json::from_str(
            r#"{"monitoringEnabled":true,"notificationsEnabled":false,"checkInterval":30}"#,
        )
        .expect("settings record should parse");

        assert!(settings.enabled);
        assert!(!settings.notifications_enabled);
        assert_eq!(settings.check_interval, CheckInterval::ThirtyMinutes);
    }

    #[test]
    fn unsupported_interval_in_record_fails_to_parse() {
        let parsed: Result<MonitoringSettings, _> =
            serde_json::from_str(r#"{"checkInterval":7}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn partial_update_keeps_unset_fields() {
        let stored = MonitoringSettings {
            enabled: true,
            check_interval: CheckInterval::SixtyMinutes,
            notifications_enabled: false,
        };

        let updated = SettingsUpdate::new()
            .with_check_interval(CheckInterval::FiveMinutes)
            .apply_to(stored);

        assert!(updated.enabled);
        assert!(!updated.notifications_enabled);
        assert_eq!(updated.check_interval, CheckInterval::FiveMinutes);
    }
}
