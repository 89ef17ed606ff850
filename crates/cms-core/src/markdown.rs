//! Markdown to HTML rendering for `.md` documents.

use pulldown_cmark::{Options, Parser, html};

/// Render a markdown document to an HTML fragment.
///
/// Tables, strikethrough, and task lists are enabled. Raw HTML in the source
/// is passed through, as CommonMark specifies.
#[must_use]
pub fn render(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}
