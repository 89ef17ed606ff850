//! Filename helpers shared by the document and image stores.

pub use cms_storage::base_name;

/// Return the dot-prefixed extension of a file name, if it has one.
///
/// Only the base name is considered. A leading dot (`.profile`) or a trailing
/// dot (`notes.`) does not start an extension. The result is returned exactly
/// as written, so comparisons against it are case-sensitive.
///
/// ```
/// # use cms_core::filename::extension;
/// assert_eq!(extension("about.md"), Some(".md"));
/// assert_eq!(extension("archive.tar.txt"), Some(".txt"));
/// assert_eq!(extension(".profile"), None);
/// ```
#[must_use]
pub fn extension(name: &str) -> Option<&str> {
    let name = base_name(name);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) if idx + 1 == name.len() => None,
        Some(idx) => Some(&name[idx..]),
    }
}
