//! JSON record files in a capability-scoped directory.
//!
//! File-backed adapters keep each record in its own JSON document. Writes go
//! to a temporary sibling, are synced, and are then renamed over the target so
//! a crash never leaves a half-written record behind. All filesystem work is
//! offloaded with [`tokio::task::spawn_blocking`].

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while reading or writing record files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("record storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A stored record could not be decoded.
    #[error("record '{name}' is not valid JSON for its type: {source}")]
    Decode {
        /// Record file name.
        name: String,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded.
    #[error("record could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    /// The blocking worker task failed.
    #[error("record storage worker failed: {0}")]
    Worker(String),
}

impl StorageError {
    /// Returns whether the error came from decoding existing data.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Handle to a directory of JSON records.
#[derive(Debug, Clone)]
pub struct RecordDir {
    dir: Arc<Dir>,
}

impl RecordDir {
    /// Opens `path`, creating it and any missing parents first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the directory cannot be created or
    /// opened.
    pub fn open(path: &Utf8Path) -> Result<Self, StorageError> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self { dir: Arc::new(dir) })
    }

    /// Opens a child directory, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the child cannot be created or
    /// opened.
    pub fn child(&self, name: &str) -> Result<Self, StorageError> {
        self.dir.create_dir_all(name)?;
        let dir = self.dir.open_dir(name)?;
        Ok(Self { dir: Arc::new(dir) })
    }

    /// Reads and decodes a record, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Decode`] for malformed records and
    /// [`StorageError::Io`] for filesystem failures.
    pub async fn read<T>(&self, name: &str) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let contents = self.read_text(name).await?;
        contents
            .map(|text| {
                serde_json::from_str(&text).map_err(|source| StorageError::Decode {
                    name: name.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    /// Reads a record as raw text, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] for filesystem failures.
    pub async fn read_text(&self, name: &str) -> Result<Option<String>, StorageError> {
        let owned_name = name.to_owned();
        self.run_blocking(move |dir| match dir.read_to_string(&owned_name) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io(err)),
        })
        .await
    }

    /// Encodes and atomically replaces a record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Encode`] when serialization fails and
    /// [`StorageError::Io`] for filesystem failures.
    pub async fn write<T>(&self, name: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec_pretty(value).map_err(StorageError::Encode)?;
        let owned_name = name.to_owned();
        self.run_blocking(move |dir| {
            let staging_name = format!(".{owned_name}.tmp");
            let mut file = dir.create(&staging_name)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            drop(file);
            dir.rename(&staging_name, dir, &owned_name)?;
            Ok(())
        })
        .await
    }

    /// Removes a record, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] for filesystem failures other than a
    /// missing file.
    pub async fn remove(&self, name: &str) -> Result<bool, StorageError> {
        let owned_name = name.to_owned();
        self.run_blocking(move |dir| match dir.remove_file(&owned_name) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::Io(err)),
        })
        .await
    }

    /// Lists record names ending in `suffix`, skipping staging files.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the directory cannot be read.
    pub async fn list(&self, suffix: &str) -> Result<Vec<String>, StorageError> {
        let owned_suffix = suffix.to_owned();
        self.run_blocking(move |dir| {
            let mut names = Vec::new();
            for entry in dir.entries()? {
                let file_name = entry?.file_name()?;
                if !file_name.starts_with('.') && file_name.ends_with(&owned_suffix) {
                    names.push(file_name);
                }
            }
            names.sort();
            Ok(names)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Dir) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || f(&dir))
            .await
            .map_err(|err| StorageError::Worker(err.to_string()))?
    }
}
