//! Storage error types.
//!
//! Every error variant carries enough context to diagnose the problem
//! without a debugger: the key or path involved and the underlying reason.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to open or create the storage location at the given path.
    #[error("failed to open storage at '{path}': {reason}")]
    Open { path: String, reason: String },

    /// Failed to read a value from storage.
    #[error("failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    /// Failed to write a value to storage.
    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },

    /// Failed to delete a key from storage.
    #[error("failed to delete key '{key}': {reason}")]
    Delete { key: String, reason: String },

    /// Failed to list keys with the given prefix.
    #[error("failed to list keys with prefix '{prefix}': {reason}")]
    List { prefix: String, reason: String },

    /// A whole-file mapping could not be encoded or decoded.
    #[error("failed to encode or decode '{path}': {reason}")]
    Encoding { path: String, reason: String },

    /// A key was empty or reduced to nothing after sanitization.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}
