//! Storage backend abstraction for the flat-file CMS.
//!
//! This crate defines the [`StorageBackend`] trait, a plain key-value
//! interface that knows nothing about documents, images, or users. The stores
//! in `cms-core` wrap a backend and apply their own allow-lists and
//! validation on top of it.
//!
//! Three implementations are provided:
//!
//! - [`DirectoryBackend`]: one file per key inside a directory (documents, images)
//! - [`YamlMapBackend`]: a whole-file YAML mapping (credentials, feature `yaml-backend`)
//! - `MemoryBackend`: in-memory, for tests (feature `test-util`)

mod directory;
mod error;
#[cfg(any(test, feature = "test-util"))]
mod memory;
#[cfg(feature = "yaml-backend")]
mod yaml;

pub use directory::DirectoryBackend;
pub use error::StorageError;
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryBackend;
#[cfg(feature = "yaml-backend")]
pub use yaml::YamlMapBackend;

/// A pluggable key-value storage backend.
///
/// Keys are plain names (a filename, a username). Values are opaque byte
/// arrays. Backends are not transactional: two writers racing on the same key
/// resolve as last-writer-wins.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a key-value pair, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. This is idempotent: deleting a non-existent key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Delete`] if the underlying backend fails.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// List all keys that start with the given prefix, sorted.
    ///
    /// An empty prefix lists every key. The listing always reflects the
    /// current contents of the backend.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::List`] if the underlying backend fails.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Check whether a key exists in storage.
    ///
    /// The default implementation calls [`get`](StorageBackend::get) and checks
    /// for `Some`. Backends may override this with a more efficient check.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Copy the value stored under `from` to `to`, overwriting `to`.
    ///
    /// Returns `false` (and writes nothing) when `from` does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] or [`StorageError::Write`] if the
    /// underlying backend fails.
    async fn copy(&self, from: &str, to: &str) -> Result<bool, StorageError> {
        match self.get(from).await? {
            Some(value) => {
                self.put(to, &value).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Reduce a user-supplied name to its final path component.
///
/// Both `/` and `\` count as separators, trailing separators are ignored, and
/// the special components `.` and `..` collapse to the empty string. The
/// result never contains a separator, so joining it onto a directory can not
/// escape that directory.
///
/// ```
/// # use cms_storage::base_name;
/// assert_eq!(base_name("../../etc/passwd"), "passwd");
/// assert_eq!(base_name("notes/"), "notes");
/// assert_eq!(base_name(".."), "");
/// ```
#[must_use]
pub fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .filter(|segment| *segment != "." && *segment != "..")
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::base_name;

    #[test]
    fn plain_names_are_unchanged() {
        assert_eq!(base_name("about.md"), "about.md");
        assert_eq!(base_name("fish.jpg"), "fish.jpg");
    }

    #[test]
    fn directory_components_are_stripped() {
        assert_eq!(base_name("../secret.txt"), "secret.txt");
        assert_eq!(base_name("/etc/passwd"), "passwd");
        assert_eq!(base_name("a/b/c.md"), "c.md");
        assert_eq!(base_name("..\\..\\boot.ini"), "boot.ini");
    }

    #[test]
    fn dot_components_collapse_to_empty() {
        assert_eq!(base_name("."), "");
        assert_eq!(base_name(".."), "");
        assert_eq!(base_name("docs/.."), "");
        assert_eq!(base_name("///"), "");
        assert_eq!(base_name(""), "");
    }
}
