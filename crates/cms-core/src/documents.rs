//! Document store: text and markdown files in one directory.
//!
//! A document is any stored key whose extension appears in
//! [`DOCUMENT_KINDS`](crate::kinds::DOCUMENT_KINDS). Files with other
//! extensions may sit in the same backend but are invisible here: they are not
//! listed, can not be viewed, and can not be created.
//!
//! Every name coming in from a caller is reduced to its base name first.

use std::borrow::Cow;
use std::sync::Arc;

use cms_storage::StorageBackend;

use crate::error::DocumentError;
use crate::filename::base_name;
use crate::kinds::DocumentKind;

/// A stored document and the rules that apply to it.
#[derive(Debug, Clone)]
pub struct Document {
    /// Sanitized file name.
    pub name: String,
    /// Raw file content.
    pub content: Vec<u8>,
    /// Extension rules for this document.
    pub kind: &'static DocumentKind,
}

impl Document {
    /// The content as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Create, read, update, duplicate, and delete documents.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore").finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Create a document store over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// List the names of all documents, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Storage`] if the backend fails.
    pub async fn list(&self) -> Result<Vec<String>, DocumentError> {
        let names = self.backend.list("").await?;
        Ok(names
            .into_iter()
            .filter(|name| DocumentKind::for_name(name).is_some())
            .collect())
    }

    /// Whether a document with this name exists.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Storage`] if the backend fails.
    pub async fn exists(&self, name: &str) -> Result<bool, DocumentError> {
        let name = base_name(name);
        if name.is_empty() || DocumentKind::for_name(name).is_none() {
            return Ok(false);
        }
        Ok(self.backend.exists(name).await?)
    }

    /// Read a document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if no document has this name, and
    /// [`DocumentError::Storage`] if the backend fails.
    pub async fn get(&self, name: &str) -> Result<Document, DocumentError> {
        let name = base_name(name);
        let not_found = || DocumentError::NotFound {
            name: name.to_owned(),
        };

        let kind = DocumentKind::for_name(name).ok_or_else(not_found)?;
        let content = self.backend.get(name).await?.ok_or_else(not_found)?;

        Ok(Document {
            name: name.to_owned(),
            content,
            kind,
        })
    }

    /// Create a new, empty document and return its sanitized name.
    ///
    /// # Errors
    ///
    /// Returns a validation error ([`DocumentError::NameRequired`],
    /// [`DocumentError::AlreadyExists`], [`DocumentError::InvalidExtension`])
    /// if the name is rejected, or [`DocumentError::Storage`] if the backend
    /// fails.
    pub async fn create(&self, name: &str) -> Result<String, DocumentError> {
        let name = self.validate_new_name(name).await?;
        self.backend.put(&name, b"").await?;
        tracing::info!(name = %name, "document created");
        Ok(name)
    }

    /// Copy an existing document to a new name and return the new name.
    ///
    /// The new name goes through the same validation as [`create`](Self::create).
    /// The copy is independent: later edits to either file do not affect the
    /// other.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a rejected target name,
    /// [`DocumentError::NotFound`] if the source does not exist, or
    /// [`DocumentError::Storage`] if the backend fails.
    pub async fn duplicate(&self, source: &str, target: &str) -> Result<String, DocumentError> {
        let target = self.validate_new_name(target).await?;
        let source = base_name(source);

        if !self.exists(source).await? || !self.backend.copy(source, &target).await? {
            return Err(DocumentError::NotFound {
                name: source.to_owned(),
            });
        }

        tracing::info!(source = %source, name = %target, "document duplicated");
        Ok(target)
    }

    /// Overwrite an existing document's content and return its name.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if the document does not exist, or
    /// [`DocumentError::Storage`] if the backend fails.
    pub async fn update(&self, name: &str, content: &[u8]) -> Result<String, DocumentError> {
        let name = self.existing_name(name).await?;
        self.backend.put(&name, content).await?;
        tracing::info!(name = %name, bytes = content.len(), "document updated");
        Ok(name)
    }

    /// Delete an existing document and return its name.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if the document does not exist, or
    /// [`DocumentError::Storage`] if the backend fails.
    pub async fn delete(&self, name: &str) -> Result<String, DocumentError> {
        let name = self.existing_name(name).await?;
        self.backend.delete(&name).await?;
        tracing::info!(name = %name, "document deleted");
        Ok(name)
    }

    async fn existing_name(&self, name: &str) -> Result<String, DocumentError> {
        let name = base_name(name);
        if self.exists(name).await? {
            Ok(name.to_owned())
        } else {
            Err(DocumentError::NotFound {
                name: name.to_owned(),
            })
        }
    }

    /// Checks, in order: non-blank, not already stored, writable extension.
    async fn validate_new_name(&self, name: &str) -> Result<String, DocumentError> {
        let name = base_name(name.trim());
        if name.is_empty() {
            return Err(DocumentError::NameRequired);
        }
        if self.backend.exists(name).await? {
            return Err(DocumentError::AlreadyExists {
                name: name.to_owned(),
            });
        }
        match DocumentKind::for_name(name) {
            Some(kind) if kind.writable => Ok(name.to_owned()),
            _ => Err(DocumentError::InvalidExtension {
                name: name.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kinds::Rendering;
    use cms_storage::MemoryBackend;

    fn store() -> (MemoryBackend, DocumentStore) {
        let backend = MemoryBackend::new();
        let store = DocumentStore::new(Arc::new(backend.clone()));
        (backend, store)
    }

    #[tokio::test]
    async fn list_filters_by_extension() {
        let (backend, store) = store();
        backend.put("about.md", b"").await.unwrap();
        backend.put("changes.txt", b"").await.unwrap();
        backend.put("photo.jpg", b"").await.unwrap();
        backend.put("README.MD", b"").await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["about.md", "changes.txt"]);
    }

    #[tokio::test]
    async fn create_then_get_is_empty_text() {
        let (_backend, store) = store();
        assert_eq!(store.create("x.txt").await.unwrap(), "x.txt");

        let doc = store.get("x.txt").await.unwrap();
        assert!(doc.content.is_empty());
        assert_eq!(doc.kind.content_type, "text/plain");
    }

    #[tokio::test]
    async fn create_validation_order() {
        let (backend, store) = store();
        backend.put("taken.exe", b"").await.unwrap();

        assert!(matches!(
            store.create("   ").await,
            Err(DocumentError::NameRequired)
        ));
        // An existing file wins over a bad extension.
        assert!(matches!(
            store.create("taken.exe").await,
            Err(DocumentError::AlreadyExists { .. })
        ));
        assert!(matches!(
            store.create("new.exe").await,
            Err(DocumentError::InvalidExtension { .. })
        ));
        assert!(!backend.exists("new.exe").await.unwrap());
    }

    #[tokio::test]
    async fn create_messages_match_form_copy() {
        let (_backend, store) = store();
        store.create("a.md").await.unwrap();

        let blank = store.create("").await.unwrap_err();
        let taken = store.create("a.md").await.unwrap_err();
        let bad = store.create("a.doc").await.unwrap_err();
        assert_eq!(blank.to_string(), "A name is required.");
        assert_eq!(taken.to_string(), "A file with that name already exists.");
        assert_eq!(bad.to_string(), "Not a valid filename extension.");
        assert!(blank.is_validation() && taken.is_validation() && bad.is_validation());
    }

    #[tokio::test]
    async fn names_are_reduced_to_base_name() {
        let (backend, store) = store();
        assert_eq!(store.create("../../etc/notes.md").await.unwrap(), "notes.md");
        assert!(backend.exists("notes.md").await.unwrap());
        assert!(store.get("/tmp/notes.md").await.is_ok());
    }

    #[tokio::test]
    async fn get_missing_or_foreign_is_not_found() {
        let (backend, store) = store();
        backend.put("photo.jpg", b"\xff\xd8").await.unwrap();

        let err = store.get("nothing.md").await.unwrap_err();
        assert_eq!(err.to_string(), "nothing.md does not exist.");
        assert!(matches!(
            store.get("photo.jpg").await,
            Err(DocumentError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn markdown_documents_carry_markdown_kind() {
        let (backend, store) = store();
        backend.put("about.md", b"# Heading").await.unwrap();
        let doc = store.get("about.md").await.unwrap();
        assert_eq!(doc.kind.rendering, Rendering::Markdown);
        assert_eq!(doc.text(), "# Heading");
    }

    #[tokio::test]
    async fn update_overwrites_content() {
        let (_backend, store) = store();
        store.create("x.txt").await.unwrap();
        store.update("x.txt", b"hello").await.unwrap();
        assert_eq!(store.get("x.txt").await.unwrap().content, b"hello");
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let (backend, store) = store();
        let err = store.update("ghost.txt", b"boo").await.unwrap_err();
        assert!(matches!(err, DocumentError::NotFound { .. }));
        assert!(!backend.exists("ghost.txt").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_copies_and_stays_independent() {
        let (backend, store) = store();
        backend.put("test.txt", b"abc").await.unwrap();

        assert_eq!(
            store.duplicate("test.txt", "test_dup.txt").await.unwrap(),
            "test_dup.txt"
        );
        store.update("test.txt", b"changed").await.unwrap();
        store.update("test_dup.txt", b"also changed").await.unwrap();

        assert_eq!(store.get("test.txt").await.unwrap().content, b"changed");
        assert_eq!(
            store.get("test_dup.txt").await.unwrap().content,
            b"also changed"
        );
    }

    #[tokio::test]
    async fn duplicate_validates_target_name() {
        let (backend, store) = store();
        backend.put("test.txt", b"abc").await.unwrap();

        assert!(matches!(
            store.duplicate("test.txt", "test.txt").await,
            Err(DocumentError::AlreadyExists { .. })
        ));
        assert!(matches!(
            store.duplicate("test.txt", "copy.pdf").await,
            Err(DocumentError::InvalidExtension { .. })
        ));
        assert!(matches!(
            store.duplicate("test.txt", "").await,
            Err(DocumentError::NameRequired)
        ));
    }

    #[tokio::test]
    async fn duplicate_missing_source_is_not_found() {
        let (backend, store) = store();
        let err = store.duplicate("ghost.txt", "copy.txt").await.unwrap_err();
        assert_eq!(err.to_string(), "ghost.txt does not exist.");
        assert!(!backend.exists("copy.txt").await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let (backend, store) = store();
        backend.put("old.md", b"bye").await.unwrap();

        assert_eq!(store.delete("old.md").await.unwrap(), "old.md");
        assert!(!backend.exists("old.md").await.unwrap());
        assert!(matches!(
            store.delete("old.md").await,
            Err(DocumentError::NotFound { .. })
        ));
    }
}
