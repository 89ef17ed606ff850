//! Server-rendered HTML pages.
//!
//! Each page is a [`View`] variant. [`render`] wraps the page body in the
//! shared layout, which shows the flash message and the sign-in status.
//! All dynamic text is HTML-escaped; file names in links are
//! percent-encoded.

use std::fmt::Write as _;

use axum::http::StatusCode;

/// Per-request data every page needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageContext<'a> {
    /// The signed-in user, if any.
    pub username: Option<&'a str>,
    /// The flash message to show once.
    pub message: Option<&'a str>,
}

/// A page and the data it displays.
#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    /// Document and image listings with actions.
    Index {
        documents: &'a [String],
        /// `None` when image support is disabled.
        images: Option<&'a [String]>,
    },
    /// Form for a new, empty document.
    NewDocument { filename: &'a str },
    /// Form to copy `source` to a new name.
    DuplicateDocument { source: &'a str, filename: &'a str },
    /// Textarea editor for an existing document.
    EditDocument { name: &'a str, content: &'a str },
    /// A markdown document rendered to HTML.
    Markdown { name: &'a str, html: &'a str },
    SignIn { username: &'a str },
    SignUp { username: &'a str },
    UploadImage,
}

/// Render `view` inside the shared layout.
#[must_use]
pub fn render(view: &View<'_>, ctx: &PageContext<'_>) -> String {
    let (title, body) = match *view {
        View::Index { documents, images } => ("Documents", index(documents, images)),
        View::NewDocument { filename } => ("New Document", new_document(filename)),
        View::DuplicateDocument { source, filename } => {
            ("Duplicate Document", duplicate_document(source, filename))
        }
        View::EditDocument { name, content } => (name, edit_document(name, content)),
        View::Markdown { name, html } => (name, html.to_owned()),
        View::SignIn { username } => ("Sign In", sign_in(username)),
        View::SignUp { username } => ("Sign Up", sign_up(username)),
        View::UploadImage => ("Upload Image", upload_image()),
    };
    layout(title, ctx, &body)
}

/// Minimal page for the generic failure path.
#[must_use]
pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<h2>{}</h2>\n<p>{}</p>\n<p><a href=\"/\">Back to documents</a></p>",
        escape(title),
        escape(message)
    );
    layout(title, &PageContext::default(), &body)
}

/// Escape text for use in HTML content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a file name for use as a path segment.
fn href(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

fn layout(title: &str, ctx: &PageContext<'_>, body: &str) -> String {
    let status = match ctx.username {
        Some(user) => format!(
            "<p class=\"user-status\">Signed in as {}.</p>\n\
             <form class=\"inline\" action=\"/users/signout\" method=\"post\">\
             <button type=\"submit\">Sign Out</button></form>",
            escape(user)
        ),
        None => "<p class=\"user-status\"><a href=\"/users/signin\">Sign In</a> \
                 or <a href=\"/users/signup\">Sign Up</a></p>"
            .to_owned(),
    };
    let flash = ctx.message.map_or_else(String::new, |msg| {
        format!("<div class=\"flash message\"><p>{}</p></div>\n", escape(msg))
    });

    LAYOUT
        .replace("{{TITLE}}", &escape(title))
        .replace("{{FLASH}}", &flash)
        .replace("{{STATUS}}", &status)
        .replace("{{BODY}}", body)
}

fn index(documents: &[String], images: Option<&[String]>) -> String {
    let mut html = String::from("<h2>Documents</h2>\n<ul class=\"documents\">\n");
    for name in documents {
        let (text, link) = (escape(name), href(name));
        let _ = writeln!(
            html,
            "<li><a href=\"/{link}\">{text}</a> \
             <a href=\"/{link}/edit\">edit</a> \
             <a href=\"/{link}/duplicate\">duplicate</a> \
             <form class=\"inline delete\" action=\"/{link}/delete\" method=\"post\">\
             <button type=\"submit\">delete</button></form></li>"
        );
    }
    html.push_str("</ul>\n<p><a href=\"/new\">New Document</a></p>\n");

    if let Some(images) = images {
        html.push_str("<h2>Images</h2>\n<ul class=\"images\">\n");
        for name in images {
            let (text, link) = (escape(name), href(name));
            let _ = writeln!(
                html,
                "<li><a href=\"/images/{link}\"><img src=\"/images/{link}\" alt=\"{text}\" width=\"120\"></a> \
                 {text} \
                 <form class=\"inline delete\" action=\"/images/{link}/delete\" method=\"post\">\
                 <button type=\"submit\">delete</button></form></li>"
            );
        }
        html.push_str("</ul>\n<p><a href=\"/images/upload\">Upload Image</a></p>\n");
    }
    html
}

fn new_document(filename: &str) -> String {
    format!(
        "<form action=\"/create\" method=\"post\">\n\
         <label for=\"filename\">Add a new document:</label>\n\
         <input name=\"filename\" id=\"filename\" value=\"{}\" placeholder=\"example.md\">\n\
         <button type=\"submit\">Create</button>\n\
         </form>",
        escape(filename)
    )
}

fn duplicate_document(source: &str, filename: &str) -> String {
    format!(
        "<form action=\"/duplicate\" method=\"post\">\n\
         <label for=\"filename\">Duplicate {} as:</label>\n\
         <input type=\"hidden\" name=\"source\" value=\"{}\">\n\
         <input name=\"filename\" id=\"filename\" value=\"{}\">\n\
         <button type=\"submit\">Duplicate</button>\n\
         </form>",
        escape(source),
        escape(source),
        escape(filename)
    )
}

fn edit_document(name: &str, content: &str) -> String {
    format!(
        "<form action=\"/{}\" method=\"post\">\n\
         <label for=\"content\">Edit content of {}:</label>\n\
         <textarea name=\"content\" id=\"content\" rows=\"20\" cols=\"80\">{}</textarea>\n\
         <button type=\"submit\">Save Changes</button>\n\
         </form>",
        href(name),
        escape(name),
        escape(content)
    )
}

fn credentials_form(action: &str, button: &str, username: &str) -> String {
    format!(
        "<form action=\"{action}\" method=\"post\">\n\
         <label for=\"username\">Username:</label>\n\
         <input name=\"username\" id=\"username\" value=\"{}\">\n\
         <label for=\"password\">Password:</label>\n\
         <input type=\"password\" name=\"password\" id=\"password\">\n\
         <button type=\"submit\">{button}</button>\n\
         </form>",
        escape(username)
    )
}

fn sign_in(username: &str) -> String {
    credentials_form("/users/signin", "Sign In", username)
}

fn sign_up(username: &str) -> String {
    credentials_form("/users/signup", "Sign Up", username)
}

fn upload_image() -> String {
    "<form action=\"/images/upload\" method=\"post\" enctype=\"multipart/form-data\">\n\
     <label for=\"image\">Choose an image:</label>\n\
     <input type=\"file\" name=\"image\" id=\"image\" accept=\".jpg\">\n\
     <button type=\"submit\">Upload</button>\n\
     </form>"
        .to_owned()
}

/// Shared page shell. Placeholders are replaced in [`layout`].
const LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>{{TITLE}}</title>
<style>
body{font-family:-apple-system,'Segoe UI',sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem;line-height:1.5;color:#222}
a{color:#2456a6}
.flash{background:#fff7d6;border:1px solid #e8d27a;padding:.25rem 1rem;margin-bottom:1rem}
.user-status{color:#555;font-size:.9rem;display:inline-block;margin-right:.5rem}
form.inline{display:inline}
ul{padding-left:1.2rem}
li{margin:.3rem 0}
textarea{width:100%;font-family:monospace}
label{display:block;margin:.5rem 0 .2rem}
</style>
</head>
<body>
<header><a href="/"><strong>CMS</strong></a>
{{STATUS}}
</header>
{{FLASH}}<main>
{{BODY}}
</main>
</body></html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(username: Option<&'a str>, message: Option<&'a str>) -> PageContext<'a> {
        PageContext { username, message }
    }

    #[test]
    fn layout_shows_sign_in_status() {
        let view = View::NewDocument { filename: "" };
        let anon = render(&view, &ctx(None, None));
        assert!(anon.contains("Sign In"));
        assert!(!anon.contains("Signed in as"));

        let admin = render(&view, &ctx(Some("admin"), None));
        assert!(admin.contains("Signed in as admin"));
        assert!(admin.contains("action=\"/users/signout\""));
    }

    #[test]
    fn flash_is_escaped() {
        let html = render(&View::UploadImage, &ctx(None, Some("<b>.md does not exist.")));
        assert!(html.contains("&lt;b&gt;.md does not exist."));
    }

    #[test]
    fn index_links_are_encoded() {
        let docs = vec!["my notes.md".to_owned()];
        let html = render(
            &View::Index {
                documents: &docs,
                images: None,
            },
            &ctx(None, None),
        );
        assert!(html.contains("href=\"/my%20notes.md/edit\""));
        assert!(html.contains(">my notes.md</a>"));
        assert!(!html.contains("Upload Image"));
    }

    #[test]
    fn edit_form_escapes_content() {
        let html = render(
            &View::EditDocument {
                name: "x.txt",
                content: "</textarea><script>",
            },
            &ctx(Some("admin"), None),
        );
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;"));
        assert!(html.contains("<button type=\"submit\""));
    }

    #[test]
    fn forms_echo_values() {
        let html = render(&View::SignIn { username: "admin" }, &ctx(None, None));
        assert!(html.contains("value=\"admin\""));

        let html = render(
            &View::DuplicateDocument {
                source: "test.txt",
                filename: "test.txt",
            },
            &ctx(Some("admin"), None),
        );
        assert!(html.contains("name=\"source\" value=\"test.txt\""));
    }

    #[test]
    fn error_page_names_status() {
        let html = error_page(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(html.contains("Internal Server Error"));
        assert!(html.contains("boom"));
    }
}
