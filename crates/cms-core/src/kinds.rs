//! Extension rules for documents and images.
//!
//! One table per namespace decides everything that depends on a file's
//! extension: whether the file is listed, whether new files may be created
//! with it, which content type it is served with, and whether it is rendered
//! from markdown. Create, duplicate, and view all consult these tables.

use crate::filename::extension;

/// How a document's bytes become a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// Render markdown to HTML and embed it in the page layout.
    Markdown,
    /// Return the stored bytes verbatim.
    Raw,
}

/// Rules for one document extension.
#[derive(Debug, PartialEq, Eq)]
pub struct DocumentKind {
    /// Dot-prefixed extension, matched case-sensitively.
    pub extension: &'static str,
    /// Content type of the response that serves this document.
    pub content_type: &'static str,
    /// How the stored bytes are turned into the response body.
    pub rendering: Rendering,
    /// Whether create and duplicate accept this extension for new files.
    pub writable: bool,
}

/// Every recognized document extension.
pub const DOCUMENT_KINDS: &[DocumentKind] = &[
    DocumentKind {
        extension: ".md",
        content_type: "text/html; charset=utf-8",
        rendering: Rendering::Markdown,
        writable: true,
    },
    DocumentKind {
        extension: ".txt",
        content_type: "text/plain",
        rendering: Rendering::Raw,
        writable: true,
    },
];

impl DocumentKind {
    /// Look up the rules for a document name by its extension.
    #[must_use]
    pub fn for_name(name: &str) -> Option<&'static Self> {
        let ext = extension(name)?;
        DOCUMENT_KINDS.iter().find(|kind| kind.extension == ext)
    }
}

/// Rules for one image extension.
#[derive(Debug, PartialEq, Eq)]
pub struct ImageKind {
    /// Dot-prefixed extension in lower case.
    pub extension: &'static str,
    /// Content type the image bytes are served with.
    pub content_type: &'static str,
}

/// Every recognized image extension.
pub const IMAGE_KINDS: &[ImageKind] = &[ImageKind {
    extension: ".jpg",
    content_type: "image/jpg",
}];

impl ImageKind {
    /// Look up the rules for an image name.
    ///
    /// Matching ignores case and looks at the end of the whole name, so
    /// `FISH.JPG` is a `.jpg` image.
    #[must_use]
    pub fn for_name(name: &str) -> Option<&'static Self> {
        let lower = name.to_ascii_lowercase();
        IMAGE_KINDS
            .iter()
            .find(|kind| lower.ends_with(kind.extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_and_text_are_documents() {
        let md = DocumentKind::for_name("about.md").map(|k| k.rendering);
        let txt = DocumentKind::for_name("changes.txt").map(|k| k.content_type);
        assert_eq!(md, Some(Rendering::Markdown));
        assert_eq!(txt, Some("text/plain"));
    }

    #[test]
    fn document_extensions_are_case_sensitive() {
        assert!(DocumentKind::for_name("about.MD").is_none());
        assert!(DocumentKind::for_name("notes.Txt").is_none());
    }

    #[test]
    fn unknown_documents_have_no_kind() {
        assert!(DocumentKind::for_name("photo.jpg").is_none());
        assert!(DocumentKind::for_name("md").is_none());
        assert!(DocumentKind::for_name(".md").is_none());
    }

    #[test]
    fn every_document_kind_is_writable() {
        assert!(DOCUMENT_KINDS.iter().all(|k| k.writable));
    }

    #[test]
    fn image_extensions_ignore_case() {
        assert_eq!(
            ImageKind::for_name("FISH.JPG").map(|k| k.content_type),
            Some("image/jpg")
        );
        assert!(ImageKind::for_name("fish.jpg").is_some());
        assert!(ImageKind::for_name("fish.png").is_none());
        assert!(ImageKind::for_name("test.test").is_none());
    }
}
