//! Error types for `cms-core`.
//!
//! Validation variants render as the exact message shown to the user, so a
//! handler can put `err.to_string()` straight into a flash or form. The
//! `Storage` variants are the fatal path: the request can not be completed.

use cms_storage::StorageError;

/// Errors from document operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The submitted name was blank (or nothing survived sanitization).
    #[error("A name is required.")]
    NameRequired,

    /// A file with the requested name is already stored.
    #[error("A file with that name already exists.")]
    AlreadyExists { name: String },

    /// The name does not end in a writable document extension.
    #[error("Not a valid filename extension.")]
    InvalidExtension { name: String },

    /// The document does not exist.
    #[error("{name} does not exist.")]
    NotFound { name: String },

    /// The storage backend failed.
    #[error("document storage error: {0}")]
    Storage(#[from] StorageError),
}

impl DocumentError {
    /// Whether this error is a rejected form submission (as opposed to a
    /// missing document or a storage failure).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NameRequired | Self::AlreadyExists { .. } | Self::InvalidExtension { .. }
        )
    }
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// The upload carried no file.
    #[error("Please choose an image to upload.")]
    NoFile,

    /// The image does not exist.
    #[error("{name} does not exist.")]
    NotFound { name: String },

    /// The file exists (or was uploaded) but is not an allowed image type.
    #[error("{name} is not a recognized image.")]
    NotRecognized { name: String },

    /// The storage backend failed.
    #[error("image storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from password hashing.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Argon2 rejected its parameters or failed to hash.
    #[error("password hashing failed: {reason}")]
    Hash { reason: String },

    /// The blocking hash task did not complete.
    #[error("password hashing task failed: {reason}")]
    Task { reason: String },
}

/// Errors from credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Sign-up with an empty username.
    #[error("Username cannot be blank.")]
    BlankUsername,

    /// Sign-up with an empty password.
    #[error("Password cannot be blank.")]
    BlankPassword,

    /// Sign-up with a username that is already registered.
    #[error("A user with that name already exists.")]
    UsernameTaken { username: String },

    /// Hashing the new password failed.
    #[error("credential hashing error: {0}")]
    Password(#[from] PasswordError),

    /// The storage backend failed.
    #[error("credential storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CredentialError {
    /// Whether this error is a rejected sign-up form.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::BlankUsername | Self::BlankPassword | Self::UsernameTaken { .. }
        )
    }
}
