//! In-memory stand-in for [`DirectoryBackend`](crate::DirectoryBackend).
//!
//! Keys go through the same [`base_name`] reduction as files on disk, so the
//! stores in `cms-core` can be unit tested against the real key semantics
//! without touching the filesystem. Only compiled for tests and behind the
//! `test-util` feature.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{StorageBackend, StorageError, base_name};

/// A flat namespace of named byte blobs held in memory.
///
/// Clones share the same contents. `put("drafts/notes.txt", ..)` stores
/// `notes.txt`, exactly as a directory backend would.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    /// An empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Same rule as a directory: the key must have a file name component.
    fn name(key: &str) -> Result<&str, StorageError> {
        match base_name(key) {
            "" => Err(StorageError::InvalidKey {
                key: key.to_owned(),
                reason: "key has no file name component".to_owned(),
            }),
            name => Ok(name),
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let name = Self::name(key)?;
        Ok(self.files.read().await.get(name).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let name = Self::name(key)?;
        self.files
            .write()
            .await
            .insert(name.to_owned(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let name = Self::name(key)?;
        self.files.write().await.remove(name);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = self
            .files
            .read()
            .await
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        names.sort_unstable();
        Ok(names)
    }

    async fn copy(&self, from: &str, to: &str) -> Result<bool, StorageError> {
        let (from, to) = (Self::name(from)?, Self::name(to)?);
        let mut files = self.files.write().await;
        let Some(value) = files.get(from).cloned() else {
            return Ok(false);
        };
        files.insert(to.to_owned(), value);
        Ok(true)
    }
}
