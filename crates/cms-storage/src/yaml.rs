//! YAML mapping backend: the whole store lives in one flat file.
//!
//! The file holds a single YAML mapping of string keys to string values:
//!
//! ```yaml
//! admin: $argon2id$v=19$m=19456,t=3,p=1$...
//! editor: $argon2id$v=19$m=19456,t=3,p=1$...
//! ```
//!
//! Every operation loads the entire mapping; every mutation writes the entire
//! mapping back. There is no lock around the load-modify-save cycle, so two
//! concurrent writers can interleave and the later save wins, dropping the
//! earlier writer's change. Callers that need stronger guarantees must use a
//! different backend.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{StorageBackend, StorageError};

type Mapping = BTreeMap<String, String>;

/// A storage backend that keeps all key-value pairs in one YAML file.
///
/// Values must be valid UTF-8; they are stored as YAML strings.
#[derive(Debug, Clone)]
pub struct YamlMapBackend {
    path: PathBuf,
}

impl YamlMapBackend {
    /// Create a backend for the YAML file at `path`.
    ///
    /// The file does not need to exist yet; a missing or empty file reads as
    /// an empty mapping and is created on the first write.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Return the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Mapping, StorageError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Mapping::new()),
            Err(e) => {
                return Err(StorageError::Read {
                    key: self.path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        if text.trim().is_empty() {
            return Ok(Mapping::new());
        }

        serde_yaml::from_str::<Option<Mapping>>(&text)
            .map(Option::unwrap_or_default)
            .map_err(|e| StorageError::Encoding {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })
    }

    async fn save(&self, mapping: &Mapping, key: &str) -> Result<(), StorageError> {
        let text = serde_yaml::to_string(mapping).map_err(|e| StorageError::Encoding {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        fs::write(&self.path, text)
            .await
            .map_err(|e| StorageError::Write {
                key: key.to_owned(),
                reason: e.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl StorageBackend for YamlMapBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let mut mapping = self.load().await?;
        Ok(mapping.remove(key).map(String::into_bytes))
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let value = std::str::from_utf8(value).map_err(|e| StorageError::Write {
            key: key.to_owned(),
            reason: format!("value is not valid UTF-8: {e}"),
        })?;

        let mut mapping = self.load().await?;
        mapping.insert(key.to_owned(), value.to_owned());
        self.save(&mapping, key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut mapping = self.load().await?;
        if mapping.remove(key).is_none() {
            return Ok(());
        }
        self.save(&mapping, key).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mapping = self.load().await?;
        Ok(mapping
            .into_keys()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}
