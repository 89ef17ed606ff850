//! Directory storage backend: one file per key.
//!
//! Each key maps to a regular file directly inside the backend's root
//! directory; the file contents are the value, verbatim. Keys are always
//! reduced to their base name (see [`base_name`]) before they are joined onto
//! the root, so no key can address a path outside of it.
//!
//! There is no in-memory index: every `list` re-reads the directory, and
//! writes are plain whole-file writes with whatever atomicity the underlying
//! filesystem provides.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{StorageBackend, StorageError, base_name};

/// A storage backend that keeps each value in its own file.
///
/// # Examples
///
/// ```no_run
/// # use cms_storage::{DirectoryBackend, StorageBackend};
/// # #[tokio::main]
/// # async fn main() {
/// let backend = DirectoryBackend::open("./data").await.unwrap();
/// backend.put("about.md", b"# About").await.unwrap();
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    root: PathBuf,
}

impl DirectoryBackend {
    /// Open a directory backend rooted at `root`, creating the directory if
    /// it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the directory can not be created.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        fs::create_dir_all(root)
            .await
            .map_err(|e| StorageError::Open {
                path: root.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Return the directory this backend stores its files in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to the file that stores it.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let name = base_name(key);
        if name.is_empty() {
            return Err(StorageError::InvalidKey {
                key: key.to_owned(),
                reason: "key has no file name component".to_owned(),
            });
        }
        Ok(self.root.join(name))
    }

    async fn is_file(path: &Path, key: &str) -> Result<bool, StorageError> {
        match fs::metadata(path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Read {
                key: key.to_owned(),
                reason: e.to_string(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for DirectoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.resolve(key)?;
        if !Self::is_file(&path, key).await? {
            return Ok(None);
        }

        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_owned(),
                reason: e.to_string(),
            }),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        fs::write(&path, value)
            .await
            .map_err(|e| StorageError::Write {
                key: key.to_owned(),
                reason: e.to_string(),
            })?;
        tracing::debug!(path = %path.display(), bytes = value.len(), "file written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "file removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Delete {
                key: key.to_owned(),
                reason: e.to_string(),
            }),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let list_err = |e: std::io::Error| StorageError::List {
            prefix: prefix.to_owned(),
            reason: e.to_string(),
        };

        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(list_err(e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            if !entry.file_type().await.map_err(list_err)?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if name.starts_with(prefix) => keys.push(name),
                Ok(_) => {}
                Err(raw) => {
                    tracing::debug!(name = ?raw, "skipping non UTF-8 file name");
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.resolve(key)?;
        Self::is_file(&path, key).await
    }

    async fn copy(&self, from: &str, to: &str) -> Result<bool, StorageError> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        if !Self::is_file(&source, from).await? {
            return Ok(false);
        }
        // Copying a file onto itself truncates it on some platforms.
        if source == target {
            return Ok(true);
        }

        fs::copy(&source, &target)
            .await
            .map_err(|e| StorageError::Write {
                key: to.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn backend() -> (tempfile::TempDir, DirectoryBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = DirectoryBackend::open(dir.path().join("data")).await.unwrap();
        (dir, backend)
    }

    #[tokio::test]
    async fn open_creates_missing_directory() {
        let (dir, backend) = backend().await;
        assert!(dir.path().join("data").is_dir());
        assert_eq!(backend.root(), dir.path().join("data").as_path());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_none() {
        let (_dir, backend) = backend().await;
        assert_eq!(backend.get("missing.txt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_and_get_roundtrip_on_disk() {
        let (_dir, backend) = backend().await;
        backend.put("about.md", b"# About").await.unwrap();

        let on_disk = std::fs::read(backend.root().join("about.md")).unwrap();
        assert_eq!(on_disk, b"# About");
        assert_eq!(
            backend.get("about.md").await.unwrap(),
            Some(b"# About".to_vec())
        );
    }

    #[tokio::test]
    async fn traversal_keys_stay_inside_root() {
        let (dir, backend) = backend().await;
        backend.put("../escaped.txt", b"nope").await.unwrap();

        assert!(!dir.path().join("escaped.txt").exists());
        assert!(backend.root().join("escaped.txt").is_file());
        assert!(backend.exists("/somewhere/else/escaped.txt").await.unwrap());
    }

    #[tokio::test]
    async fn empty_key_is_rejected() {
        let (_dir, backend) = backend().await;
        let err = backend.put("..", b"x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey { .. }));
    }

    #[tokio::test]
    async fn delete_nonexistent_is_noop() {
        let (_dir, backend) = backend().await;
        backend.delete("nope.txt").await.unwrap();
    }

    #[tokio::test]
    async fn list_skips_directories_and_sorts() {
        let (_dir, backend) = backend().await;
        backend.put("b.txt", b"").await.unwrap();
        backend.put("a.md", b"").await.unwrap();
        std::fs::create_dir(backend.root().join("nested.md")).unwrap();

        assert_eq!(backend.list("").await.unwrap(), vec!["a.md", "b.txt"]);
        assert_eq!(backend.list("b").await.unwrap(), vec!["b.txt"]);
    }

    #[tokio::test]
    async fn list_reflects_external_changes() {
        let (_dir, backend) = backend().await;
        std::fs::write(backend.root().join("outside.txt"), b"hi").unwrap();
        assert_eq!(backend.list("").await.unwrap(), vec!["outside.txt"]);

        std::fs::remove_file(backend.root().join("outside.txt")).unwrap();
        assert!(backend.list("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn copy_duplicates_independent_content() {
        let (_dir, backend) = backend().await;
        backend.put("test.txt", b"abc").await.unwrap();

        assert!(backend.copy("test.txt", "test_dup.txt").await.unwrap());
        backend.put("test.txt", b"changed").await.unwrap();

        assert_eq!(
            backend.get("test_dup.txt").await.unwrap(),
            Some(b"abc".to_vec())
        );
    }

    #[tokio::test]
    async fn copy_missing_source_writes_nothing() {
        let (_dir, backend) = backend().await;
        assert!(!backend.copy("ghost.txt", "copy.txt").await.unwrap());
        assert!(!backend.exists("copy.txt").await.unwrap());
    }

    #[tokio::test]
    async fn copy_onto_itself_keeps_content() {
        let (_dir, backend) = backend().await;
        backend.put("same.txt", b"keep me").await.unwrap();
        assert!(backend.copy("same.txt", "./same.txt").await.unwrap());
        assert_eq!(
            backend.get("same.txt").await.unwrap(),
            Some(b"keep me".to_vec())
        );
    }
}
