//! Credential store: username to password-hash mapping.
//!
//! The store sits on top of any [`StorageBackend`]; in production that is a
//! [`YamlMapBackend`](cms_storage::YamlMapBackend), which reloads the whole
//! file for every lookup and rewrites it for every sign-up. Nothing serializes
//! concurrent sign-ups: two registrations racing through the load-modify-save
//! cycle can lose one of the new accounts.
//!
//! Only Argon2id hashes are stored. Hashing and verification run on the
//! blocking thread pool so they do not stall the async runtime.

use std::sync::Arc;

use cms_storage::StorageBackend;

use crate::error::{CredentialError, PasswordError};
use crate::password;

/// Register and authenticate users.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Create a credential store over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// List all registered usernames, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Storage`] if the backend fails.
    pub async fn usernames(&self) -> Result<Vec<String>, CredentialError> {
        Ok(self.backend.list("").await?)
    }

    /// Whether a user with this name is registered.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Storage`] if the backend fails.
    pub async fn exists(&self, username: &str) -> Result<bool, CredentialError> {
        Ok(self.backend.exists(username).await?)
    }

    /// Check a username and password.
    ///
    /// Unknown users and wrong passwords both yield `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Storage`] if the backend fails, or
    /// [`CredentialError::Password`] if the verification task dies.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        let Some(stored) = self.backend.get(username).await? else {
            return Ok(false);
        };
        let stored = String::from_utf8_lossy(&stored).into_owned();
        let password = password.to_owned();

        let verified = tokio::task::spawn_blocking(move || {
            password::verify_password(&password, &stored)
        })
        .await
        .map_err(|e| PasswordError::Task {
            reason: e.to_string(),
        })?;

        if !verified {
            tracing::info!(username = %username, "sign-in rejected");
        }
        Ok(verified)
    }

    /// Register a new user and return the stored username.
    ///
    /// The username is trimmed; the password is hashed as given.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::BlankUsername`],
    /// [`CredentialError::BlankPassword`], or
    /// [`CredentialError::UsernameTaken`] when the sign-up is rejected (the
    /// store is left untouched), [`CredentialError::Password`] if hashing
    /// fails, and [`CredentialError::Storage`] if the backend fails.
    pub async fn register(&self, username: &str, password: &str) -> Result<String, CredentialError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(CredentialError::BlankUsername);
        }
        if password.is_empty() {
            return Err(CredentialError::BlankPassword);
        }
        if self.backend.exists(username).await? {
            return Err(CredentialError::UsernameTaken {
                username: username.to_owned(),
            });
        }

        let password = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
            .await
            .map_err(|e| PasswordError::Task {
                reason: e.to_string(),
            })??;

        self.backend.put(username, hash.as_bytes()).await?;
        tracing::info!(username = %username, "account created");
        Ok(username.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cms_storage::{MemoryBackend, YamlMapBackend};

    fn store() -> (MemoryBackend, CredentialStore) {
        let backend = MemoryBackend::new();
        let store = CredentialStore::new(Arc::new(backend.clone()));
        (backend, store)
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let (_backend, store) = store();
        store.register("admin", "secret").await.unwrap();

        assert!(store.authenticate("admin", "secret").await.unwrap());
        assert!(!store.authenticate("admin", "wrong").await.unwrap());
        assert!(!store.authenticate("guest", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn plaintext_is_never_stored() {
        let (backend, store) = store();
        store.register("admin", "secret").await.unwrap();

        let stored = backend.get("admin").await.unwrap().unwrap();
        let stored = String::from_utf8(stored).unwrap();
        assert_ne!(stored, "secret");
        assert!(stored.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let (backend, store) = store();

        let no_name = store.register("  ", "secret").await.unwrap_err();
        let no_pass = store.register("test", "").await.unwrap_err();
        assert_eq!(no_name.to_string(), "Username cannot be blank.");
        assert_eq!(no_pass.to_string(), "Password cannot be blank.");
        assert!(no_name.is_validation() && no_pass.is_validation());
        assert!(backend.list("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_username_leaves_store_unchanged() {
        let (backend, store) = store();
        store.register("admin", "secret").await.unwrap();
        let before = backend.get("admin").await.unwrap();

        for _ in 0..2 {
            let err = store.register("admin", "other").await.unwrap_err();
            assert_eq!(err.to_string(), "A user with that name already exists.");
        }

        assert_eq!(backend.get("admin").await.unwrap(), before);
        assert!(store.authenticate("admin", "secret").await.unwrap());
        assert_eq!(store.usernames().await.unwrap(), vec!["admin"]);
    }

    #[tokio::test]
    async fn malformed_stored_hash_never_authenticates() {
        let (backend, store) = store();
        backend.put("legacy", b"secret").await.unwrap();
        assert!(store.exists("legacy").await.unwrap());
        assert!(!store.authenticate("legacy", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn persists_through_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.yml");
        let store = CredentialStore::new(Arc::new(YamlMapBackend::new(&path)));
        store.register("writer", "pen").await.unwrap();

        let reopened = CredentialStore::new(Arc::new(YamlMapBackend::new(&path)));
        assert!(reopened.authenticate("writer", "pen").await.unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("writer:"));
    }
}
