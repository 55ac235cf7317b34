//! Alert message rendering.

use super::AlertRequest;
use minijinja::Environment;
use thiserror::Error;

/// Template used when none is configured.
pub const DEFAULT_ALERT_TEMPLATE: &str = "{{ label }} ({{ host }}) is now {{ to }} (was {{ from }})";

/// Error returned for a template that does not compile.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid alert template: {reason}")]
pub struct AlertTemplateError {
    /// Compiler diagnostic.
    pub reason: String,
}

/// `minijinja` template turning an [`AlertRequest`] into alert text.
///
/// The template sees `label`, `host`, `from`, `to`, `severity`,
/// `server_id` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertTemplate {
    source: String,
}

impl AlertTemplate {
    /// Compiles `source` to check it before use.
    ///
    /// # Errors
    ///
    /// Returns [`AlertTemplateError`] when the template has syntax errors.
    pub fn new(source: impl Into<String>) -> Result<Self, AlertTemplateError> {
        let owned = source.into();
        Environment::new()
            .template_from_str(&owned)
            .map_err(|error| AlertTemplateError {
                reason: error.to_string(),
            })?;
        Ok(Self { source: owned })
    }

    /// Returns the template source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders the alert text.
    ///
    /// A render failure falls back to the built-in wording so an alert is
    /// never lost to a template mistake.
    #[must_use]
    pub fn render(&self, alert: &AlertRequest) -> String {
        Environment::new()
            .render_str(&self.source, alert)
            .unwrap_or_else(|_| fallback_message(alert))
    }
}

impl Default for AlertTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_ALERT_TEMPLATE.to_owned(),
        }
    }
}

fn fallback_message(alert: &AlertRequest) -> String {
    format!(
        "{} ({}) is now {} (was {})",
        alert.label, alert.host, alert.to, alert.from
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::domain::{HealthStatus, TransitionEvent};
    use crate::inventory::domain::{CredentialRef, ServerDefinition};
    use chrono::Utc;

    fn alert() -> AlertRequest {
        let credential = CredentialRef::new("db").expect("valid credential reference");
        let server = ServerDefinition::new("Primary DB", "db.internal", "ops", credential)
            .expect("valid definition");
        let event = TransitionEvent {
            server_id: server.id(),
            from: HealthStatus::Healthy,
            to: HealthStatus::Unreachable,
            timestamp: Utc::now(),
        };
        AlertRequest::for_transition(&server, &event)
    }

    #[test]
    fn default_template_names_server_and_statuses() {
        assert_eq!(
            AlertTemplate::default().render(&alert()),
            "Primary DB (db.internal) is now unreachable (was healthy)"
        );
    }

    #[test]
    fn custom_template_sees_severity() {
        let template =
            AlertTemplate::new("[{{ severity }}] {{ label }}").expect("template should compile");
        assert_eq!(template.render(&alert()), "[critical] Primary DB");
    }

    #[test]
    fn broken_template_is_rejected() {
        assert!(AlertTemplate::new("{{ label").is_err());
    }

    #[test]
    fn render_errors_fall_back_to_plain_wording() {
        let template =
            AlertTemplate::new("{{ label + 1 }}").expect("type errors surface at render time");
        assert_eq!(
            template.render(&alert()),
            "Primary DB (db.internal) is now unreachable (was healthy)"
        );
    }
}
