//! Image store: uploaded images in their own directory.
//!
//! Images live in a separate backend from documents. A stored file only counts
//! as an image when its name matches [`IMAGE_KINDS`](crate::kinds::IMAGE_KINDS);
//! anything else in the directory is reported as "not a recognized image"
//! when requested by name and left out of listings.

use std::path::Path;
use std::sync::Arc;

use cms_storage::{StorageBackend, StorageError};

use crate::error::ImageError;
use crate::filename::base_name;
use crate::kinds::ImageKind;

/// A stored image and the rules that apply to it.
#[derive(Debug, Clone)]
pub struct Image {
    /// Sanitized file name.
    pub name: String,
    /// Raw image bytes.
    pub content: Vec<u8>,
    /// Extension rules for this image.
    pub kind: &'static ImageKind,
}

/// Upload, read, list, and delete images.
#[derive(Clone)]
pub struct ImageStore {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore").finish_non_exhaustive()
    }
}

impl ImageStore {
    /// Create an image store over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// List the names of all recognized images, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Storage`] if the backend fails.
    pub async fn list(&self) -> Result<Vec<String>, ImageError> {
        let names = self.backend.list("").await?;
        Ok(names
            .into_iter()
            .filter(|name| ImageKind::for_name(name).is_some())
            .collect())
    }

    /// Whether a recognized image with this name exists.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Storage`] if the backend fails.
    pub async fn exists(&self, name: &str) -> Result<bool, ImageError> {
        let name = base_name(name);
        if name.is_empty() || ImageKind::for_name(name).is_none() {
            return Ok(false);
        }
        Ok(self.backend.exists(name).await?)
    }

    /// Read an image.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::NotFound`] if nothing is stored under the name,
    /// [`ImageError::NotRecognized`] if a file exists but is not an allowed
    /// image type, and [`ImageError::Storage`] if the backend fails.
    pub async fn get(&self, name: &str) -> Result<Image, ImageError> {
        let name = base_name(name);
        let not_found = || ImageError::NotFound {
            name: name.to_owned(),
        };
        if name.is_empty() {
            return Err(not_found());
        }

        let content = self.backend.get(name).await?.ok_or_else(not_found)?;
        let kind = ImageKind::for_name(name).ok_or_else(|| ImageError::NotRecognized {
            name: name.to_owned(),
        })?;

        Ok(Image {
            name: name.to_owned(),
            content,
            kind,
        })
    }

    /// Copy an uploaded temporary file into the store under the base name of
    /// `original_name`, overwriting any image already stored there.
    ///
    /// Returns the name the image was stored under.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::NoFile`] if the original name is blank,
    /// [`ImageError::NotRecognized`] if it is not an allowed image type, and
    /// [`ImageError::Storage`] if the temporary file can not be read or the
    /// backend fails.
    pub async fn upload(&self, original_name: &str, source: &Path) -> Result<String, ImageError> {
        let name = base_name(original_name.trim());
        if name.is_empty() {
            return Err(ImageError::NoFile);
        }
        if ImageKind::for_name(name).is_none() {
            return Err(ImageError::NotRecognized {
                name: name.to_owned(),
            });
        }

        let bytes = tokio::fs::read(source)
            .await
            .map_err(|e| StorageError::Read {
                key: source.display().to_string(),
                reason: e.to_string(),
            })?;
        self.backend.put(name, &bytes).await?;

        tracing::info!(name = %name, bytes = bytes.len(), "image uploaded");
        Ok(name.to_owned())
    }

    /// Delete a stored file from the image directory and return its name.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::NotFound`] if nothing is stored under the name,
    /// and [`ImageError::Storage`] if the backend fails.
    pub async fn delete(&self, name: &str) -> Result<String, ImageError> {
        let name = base_name(name);
        if name.is_empty() || !self.backend.exists(name).await? {
            return Err(ImageError::NotFound {
                name: name.to_owned(),
            });
        }

        self.backend.delete(name).await?;
        tracing::info!(name = %name, "image deleted");
        Ok(name.to_owned())
    }
}
