//! Server definition value object.

use super::{CredentialRef, InventoryDomainError, ServerId};
use serde::{Deserialize, Serialize};

/// Default SSH port.
const DEFAULT_SSH_PORT: u16 = 22;

/// A remote server registered for monitoring.
///
/// Definitions are owned by the configuration store and are read-only to the
/// monitoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ServerRecord")]
pub struct ServerDefinition {
    id: ServerId,
    label: String,
    host: String,
    port: u16,
    username: String,
    credential_ref: CredentialRef,
    monitored: bool,
}

/// Unvalidated persisted shape; decoding goes through the constructors.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerRecord {
    id: ServerId,
    #[serde(default)]
    label: String,
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    username: String,
    credential_ref: CredentialRef,
    #[serde(default = "default_monitored")]
    monitored: bool,
}

impl TryFrom<ServerRecord> for ServerDefinition {
    type Error = InventoryDomainError;

    fn try_from(record: ServerRecord) -> Result<Self, Self::Error> {
        Ok(
            Self::new(record.label, record.host, record.username, record.credential_ref)?
                .with_id(record.id)
                .with_port(record.port)?
                .with_monitored(record.monitored),
        )
    }
}

const fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

const fn default_monitored() -> bool {
    true
}

impl ServerDefinition {
    /// Creates a server definition on the default SSH port.
    ///
    /// An empty label falls back to the host name.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryDomainError`] when the host or username is empty, or
    /// the host contains whitespace or starts with `-`.
    pub fn new(
        label: impl Into<String>,
        host: impl Into<String>,
        username: impl Into<String>,
        credential_ref: CredentialRef,
    ) -> Result<Self, InventoryDomainError> {
        let normalized_host = host.into().trim().to_owned();
        if normalized_host.is_empty() {
            return Err(InventoryDomainError::EmptyHost);
        }
        if normalized_host.starts_with('-')
            || normalized_host
                .chars()
                .any(|character| character.is_whitespace() || character.is_control())
        {
            return Err(InventoryDomainError::InvalidHost(normalized_host));
        }

        let normalized_username = username.into().trim().to_owned();
        if normalized_username.is_empty() {
            return Err(InventoryDomainError::EmptyUsername);
        }

        let trimmed_label = label.into().trim().to_owned();
        let normalized_label = if trimmed_label.is_empty() {
            normalized_host.clone()
        } else {
            trimmed_label
        };

        Ok(Self {
            id: ServerId::new(),
            label: normalized_label,
            host: normalized_host,
            port: DEFAULT_SSH_PORT,
            username: normalized_username,
            credential_ref,
            monitored: true,
        })
    }

    /// Replaces the generated identifier.
    #[must_use]
    pub const fn with_id(mut self, id: ServerId) -> Self {
        self.id = id;
        self
    }

    /// Sets a non-default SSH port.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryDomainError::InvalidPort`] for port zero.
    pub fn with_port(mut self, port: u16) -> Result<Self, InventoryDomainError> {
        if port == 0 {
            return Err(InventoryDomainError::InvalidPort);
        }
        self.port = port;
        Ok(self)
    }

    /// Includes or excludes the server from monitoring passes.
    #[must_use]
    pub const fn with_monitored(mut self, monitored: bool) -> Self {
        self.monitored = monitored;
        self
    }

    /// Returns the server identifier.
    #[must_use]
    pub const fn id(&self) -> ServerId {
        self.id
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the host name or address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the SSH port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the login user name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the credential lookup key.
    #[must_use]
    pub const fn credential_ref(&self) -> &CredentialRef {
        &self.credential_ref
    }

    /// Returns whether the server takes part in monitoring passes.
    #[must_use]
    pub const fn is_monitored(&self) -> bool {
        self.monitored
    }

    /// Returns `user@host:port` for diagnostics.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn credential() -> CredentialRef {
        CredentialRef::new("web").expect("valid credential reference")
    }

    #[test]
    fn new_definition_defaults_to_port_22_and_monitored() {
        let server = ServerDefinition::new("Web", " web.example.com ", "deploy", credential())
            .expect("valid definition");

        assert_eq!(server.host(), "web.example.com");
        assert_eq!(server.port(), 22);
        assert!(server.is_monitored());
        assert_eq!(server.destination(), "deploy@web.example.com:22");
    }

    #[test]
    fn empty_label_falls_back_to_host() {
        let server = ServerDefinition::new("  ", "10.0.0.5", "root", credential())
            .expect("valid definition");
        assert_eq!(server.label(), "10.0.0.5");
    }

    #[rstest]
    #[case("", "root", InventoryDomainError::EmptyHost)]
    #[case("bad host", "root", InventoryDomainError::InvalidHost("bad host".to_owned()))]
    #[case(
        "-oProxyCommand=id",
        "root",
        InventoryDomainError::InvalidHost("-oProxyCommand=id".to_owned())
    )]
    #[case("host", "  ", InventoryDomainError::EmptyUsername)]
    fn invalid_definitions_are_rejected(
        #[case] host: &str,
        #[case] username: &str,
        #[case] expected: InventoryDomainError,
    ) {
        let result = ServerDefinition::new("label", host, username, credential());
        assert_eq!(result, Err(expected));
    }

    #[test]
    fn port_zero_is_rejected() {
        let server =
            ServerDefinition::new("a", "host", "root", credential()).expect("valid definition");
        assert_eq!(server.with_port(0), Err(InventoryDomainError::InvalidPort));
    }

    #[test]
    fn missing_port_and_monitored_fields_use_defaults() {
        let json = r#"{
            "id": "6f2d3c1e-8a4b-4c55-9a1e-0b8f0c6d7e21",
            "label": "db",
            "host": "db.internal",
            "username": "ops",
            "credentialRef": "db"
        }"#;
        let server: ServerDefinition = serde_json::from_str(json).expect("valid server json");

        assert_eq!(server.port(), 22);
        assert!(server.is_monitored());
    }

    #[rstest]
    #[case(r#""host": "", "port": 22"#)]
    #[case(r#""host": "bad host", "port": 22"#)]
    #[case(r#""host": "-oProxyCommand=id", "port": 22"#)]
    #[case(r#""host": "db.internal", "port": 0"#)]
    fn invalid_persisted_definitions_are_rejected(#[case] fields: &str) {
        let json = format!(
            r#"{{"id": "6f2d3c1e-8a4b-4c55-9a1e-0b8f0c6d7e21", "username": "ops", "credentialRef": "db", {fields}}}"#
        );
        let result: Result<ServerDefinition, _> = serde_json::from_str(&json);
        assert!(result.is_err());
    }
}
