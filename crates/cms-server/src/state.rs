//! Shared application state for the CMS server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It holds the document, image, and credential
//! stores plus the session store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use cms_core::credentials::CredentialStore;
use cms_core::documents::DocumentStore;
use cms_core::images::ImageStore;
use cms_core::session::SessionStore;
use cms_storage::{DirectoryBackend, StorageError, YamlMapBackend};

use crate::config::ServerConfig;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Text and markdown documents.
    pub documents: DocumentStore,
    /// Uploaded images.
    pub images: ImageStore,
    /// Username to password-hash mapping.
    pub credentials: CredentialStore,
    /// Per-client session data.
    pub sessions: SessionStore,
    /// Whether image routes are mounted and images are listed.
    pub enable_images: bool,
    /// Whether the session cookie is marked `Secure`.
    pub secure_cookies: bool,
    /// Request body limit, applied to uploads.
    pub max_upload_bytes: usize,
    /// Permits shared by sign-in and sign-up, which both run Argon2.
    pub credential_permits: Arc<Semaphore>,
}

/// Concurrent sign-in and sign-up requests, across both routes.
pub const CREDENTIAL_CONCURRENCY: usize = 16;

impl AppState {
    /// Open the stores described by `config`, creating the document and
    /// image directories if they are missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if a store directory can not be created.
    pub async fn open(config: &ServerConfig) -> Result<Arc<Self>, StorageError> {
        let documents = DirectoryBackend::open(&config.data_dir).await?;
        let images = DirectoryBackend::open(&config.image_dir).await?;
        let credentials = YamlMapBackend::new(&config.users_file);

        tracing::info!(
            data_dir = %config.data_dir.display(),
            image_dir = %config.image_dir.display(),
            users_file = %config.users_file.display(),
            "stores opened"
        );

        Ok(Arc::new(Self {
            documents: DocumentStore::new(Arc::new(documents)),
            images: ImageStore::new(Arc::new(images)),
            credentials: CredentialStore::new(Arc::new(credentials)),
            sessions: SessionStore::with_limits(
                Duration::from_secs(config.session_idle_secs),
                config.max_sessions,
            ),
            enable_images: config.enable_images,
            secure_cookies: config.secure_cookies,
            max_upload_bytes: config.max_upload_bytes,
            credential_permits: Arc::new(Semaphore::new(CREDENTIAL_CONCURRENCY)),
        }))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("enable_images", &self.enable_images)
            .finish_non_exhaustive()
    }
}
