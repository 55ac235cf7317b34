//! Key-file credential store.

use async_trait::async_trait;

use crate::inventory::{
    domain::{CredentialRef, Secret},
    ports::{CredentialStore, CredentialStoreError, CredentialStoreResult},
};
use crate::storage::RecordDir;

const KEY_SUFFIX: &str = ".key";
const PASSPHRASE_SUFFIX: &str = ".passphrase";
const PASSWORD_SUFFIX: &str = ".password";

/// Credential store reading secrets from a directory of plain files.
///
/// `<ref>.key` holds a private key, optionally unlocked by
/// `<ref>.passphrase`. `<ref>.password` holds a password and is used when no
/// key exists. The store is read-only apart from [`CredentialStore::clear`].
#[derive(Debug, Clone)]
pub struct KeyFileCredentialStore {
    records: RecordDir,
}

fn single_line(contents: String) -> String {
    contents.trim_end_matches(['\r', '\n']).to_owned()
}

impl KeyFileCredentialStore {
    /// Creates a store over an opened credentials directory.
    #[must_use]
    pub const fn new(records: RecordDir) -> Self {
        Self { records }
    }

    async fn read(&self, credential_ref: &CredentialRef, suffix: &str) -> CredentialStoreResult<Option<String>> {
        let name = format!("{}{suffix}", credential_ref.as_str());
        self.records
            .read_text(&name)
            .await
            .map_err(CredentialStoreError::persistence)
    }
}

#[async_trait]
impl CredentialStore for KeyFileCredentialStore {
    async fn resolve(&self, credential_ref: &CredentialRef) -> CredentialStoreResult<Secret> {
        if let Some(key) = self.read(credential_ref, KEY_SUFFIX).await? {
            let secret = Secret::private_key(key);
            return Ok(match self.read(credential_ref, PASSPHRASE_SUFFIX).await? {
                Some(passphrase) => secret.with_passphrase(single_line(passphrase)),
                None => secret,
            });
        }
        match self.read(credential_ref, PASSWORD_SUFFIX).await? {
            Some(password) => Ok(Secret::password(single_line(password))),
            None => Err(CredentialStoreError::NotFound(credential_ref.clone())),
        }
    }

    async fn clear(&self) -> CredentialStoreResult<()> {
        for suffix in [KEY_SUFFIX, PASSPHRASE_SUFFIX, PASSWORD_SUFFIX] {
            let names = self
                .records
                .list(suffix)
                .await
                .map_err(CredentialStoreError::persistence)?;
            for name in names {
                self.records
                    .remove(&name)
                    .await
                    .map_err(CredentialStoreError::persistence)?;
            }
        }
        Ok(())
    }
}
