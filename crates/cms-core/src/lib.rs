//! Core library for the flat-file CMS.
//!
//! Contains the document, image and credential stores, the extension table
//! that decides which files are documents or images and how they are served,
//! password hashing, per-client session state, and markdown rendering. This
//! crate depends on `cms-storage` for the backend trait and knows nothing
//! about HTTP.

pub mod credentials;
pub mod documents;
pub mod error;
pub mod filename;
pub mod images;
pub mod kinds;
pub mod markdown;
pub mod password;
pub mod session;
