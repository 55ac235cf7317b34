//! Transient credential material resolved for a single probe.

use std::fmt;

/// Authentication material for one server.
///
/// Secrets are never serialized, persisted, or logged by the engine. The
/// `Debug` implementation only reveals the kind of secret.
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    /// Password authentication.
    Password(String),
    /// Private key authentication, optionally protected by a passphrase.
    PrivateKey {
        /// PEM or OpenSSH-encoded private key.
        key: String,
        /// Passphrase that unlocks the key.
        passphrase: Option<String>,
    },
}

impl Secret {
    /// Creates a password secret.
    #[must_use]
    pub fn password(value: impl Into<String>) -> Self {
        Self::Password(value.into())
    }

    /// Creates an unencrypted private key secret.
    #[must_use]
    pub fn private_key(key: impl Into<String>) -> Self {
        Self::PrivateKey {
            key: key.into(),
            passphrase: None,
        }
    }

    /// Adds a passphrase to a private key secret.
    ///
    /// Password secrets are returned unchanged.
    #[must_use]
    pub fn with_passphrase(self, value: impl Into<String>) -> Self {
        match self {
            Self::PrivateKey { key, .. } => Self::PrivateKey {
                key,
                passphrase: Some(value.into()),
            },
            password @ Self::Password(_) => password,
        }
    }

    /// Returns the kind of secret for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Password(_) => "password",
            Self::PrivateKey { .. } => "private_key",
        }
    }

    /// Returns the value an askpass helper should answer with, if any.
    #[must_use]
    pub fn prompt_answer(&self) -> Option<&str> {
        match self {
            Self::Password(password) => Some(password.as_str()),
            Self::PrivateKey { passphrase, .. } => passphrase.as_deref(),
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Secret({}, <redacted>)", self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::Secret;

    #[test]
    fn debug_output_redacts_material() {
        let secret = Secret::private_key("-----BEGIN KEY-----").with_passphrase("hunter2");
        let rendered = format!("{secret:?}");

        assert_eq!(rendered, "Secret(private_key, <redacted>)");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn prompt_answer_prefers_password_or_passphrase() {
        assert_eq!(Secret::password("pw").prompt_answer(), Some("pw"));
        assert_eq!(Secret::private_key("k").prompt_answer(), None);
        assert_eq!(
            Secret::private_key("k").with_passphrase("pp").prompt_answer(),
            Some("pp")
        );
    }

    #[test]
    fn passphrase_is_ignored_for_passwords() {
        let secret = Secret::password("pw").with_passphrase("ignored");
        assert_eq!(secret, Secret::password("pw"));
    }
}
