//! HTTP error types for the CMS server.
//!
//! Only failures the request can not recover from end up here: storage and
//! hashing errors, and malformed uploads. Validation failures and missing
//! files are handled inside the handlers as re-rendered forms or redirects.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use cms_core::error::{CredentialError, DocumentError, ImageError};

use crate::views;

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// The request body could not be read (e.g. a broken multipart upload).
    BadRequest(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => {
                tracing::warn!(error = %msg, "bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_owned(),
                )
            }
        };

        (status, Html(views::error_page(status, &message))).into_response()
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Storage(_) => Self::Internal(err.to_string()),
            DocumentError::NameRequired
            | DocumentError::AlreadyExists { .. }
            | DocumentError::InvalidExtension { .. }
            | DocumentError::NotFound { .. } => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Storage(_) => Self::Internal(err.to_string()),
            ImageError::NoFile | ImageError::NotFound { .. } | ImageError::NotRecognized { .. } => {
                Self::BadRequest(err.to_string())
            }
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Storage(_) | CredentialError::Password(_) => {
                Self::Internal(err.to_string())
            }
            CredentialError::BlankUsername
            | CredentialError::BlankPassword
            | CredentialError::UsernameTaken { .. } => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Self::BadRequest(format!("could not read upload: {}", err.body_text()))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("i/o error: {err}"))
    }
}
