//! Document routes: view, create, duplicate, edit, and delete.
//!
//! Form handlers re-render their form with `422` on validation failures and
//! redirect home with `302` otherwise. A GET for a missing document
//! redirects home with `303`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::{Extension, Form};
use serde::Deserialize;

use cms_core::documents::Document;
use cms_core::error::DocumentError;
use cms_core::filename::base_name;
use cms_core::kinds::Rendering;
use cms_core::markdown;
use cms_core::session::Session;

use crate::error::AppError;
use crate::reply::Reply;
use crate::state::AppState;
use crate::views::View;

/// Submitted new-document form.
#[derive(Debug, Deserialize)]
pub struct NewDocumentForm {
    #[serde(default)]
    filename: String,
}

/// Submitted duplicate form.
#[derive(Debug, Deserialize)]
pub struct DuplicateForm {
    #[serde(default)]
    source: String,
    #[serde(default)]
    filename: String,
}

/// Submitted editor form.
#[derive(Debug, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    content: String,
}

/// `GET /new`
pub async fn new_form(Extension(session): Extension<Session>) -> Reply {
    Reply::render(session, StatusCode::OK, None, &View::NewDocument { filename: "" })
}

/// `POST /create`: create an empty document.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Form(form): Form<NewDocumentForm>,
) -> Result<Reply, AppError> {
    match state.documents.create(&form.filename).await {
        Ok(name) => Ok(Reply::found(session.with_message(format!("{name} was created.")), "/")),
        Err(err) if err.is_validation() => Ok(Reply::render(
            session,
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(err.to_string()),
            &View::NewDocument {
                filename: &form.filename,
            },
        )),
        Err(err) => Err(err.into()),
    }
}

/// `GET /{filename}/duplicate`: form pre-filled with the source name.
pub async fn duplicate_form(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(filename): Path<String>,
) -> Result<Reply, AppError> {
    match state.documents.get(&filename).await {
        Ok(doc) => Ok(Reply::render(
            session,
            StatusCode::OK,
            None,
            &View::DuplicateDocument {
                source: &doc.name,
                filename: &doc.name,
            },
        )),
        Err(err) => missing(session, err, Reply::see_other),
    }
}

/// `POST /duplicate`: copy a document to a new name.
pub async fn duplicate(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Form(form): Form<DuplicateForm>,
) -> Result<Reply, AppError> {
    match state.documents.duplicate(&form.source, &form.filename).await {
        Ok(name) => Ok(Reply::found(session.with_message(format!("{name} was created.")), "/")),
        Err(err) if err.is_validation() => Ok(Reply::render(
            session,
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(err.to_string()),
            &View::DuplicateDocument {
                source: base_name(&form.source),
                filename: &form.filename,
            },
        )),
        Err(err) => missing(session, err, Reply::found),
    }
}

/// `GET /{filename}`: show a document, or redirect to an image of that name.
pub async fn show(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(filename): Path<String>,
) -> Result<Reply, AppError> {
    let name = base_name(&filename);
    if state.enable_images && state.images.exists(name).await? {
        let location = format!("/images/{}", urlencoding::encode(name));
        return Ok(Reply::see_other(session, &location));
    }

    match state.documents.get(name).await {
        Ok(doc) => Ok(document_response(session, &doc)),
        Err(err) => missing(session, err, Reply::see_other),
    }
}

fn document_response(session: Session, doc: &Document) -> Reply {
    match doc.kind.rendering {
        Rendering::Markdown => {
            let html = markdown::render(&doc.text());
            Reply::render(
                session,
                StatusCode::OK,
                None,
                &View::Markdown {
                    name: &doc.name,
                    html: &html,
                },
            )
        }
        Rendering::Raw => Reply::new(
            session,
            ([(CONTENT_TYPE, doc.kind.content_type)], doc.content.clone()),
        ),
    }
}

/// `GET /{filename}/edit`
pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(filename): Path<String>,
) -> Result<Reply, AppError> {
    match state.documents.get(&filename).await {
        Ok(doc) => Ok(Reply::render(
            session,
            StatusCode::OK,
            None,
            &View::EditDocument {
                name: &doc.name,
                content: &doc.text(),
            },
        )),
        Err(err) => missing(session, err, Reply::see_other),
    }
}

/// `POST /{filename}`: overwrite a document's content.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(filename): Path<String>,
    Form(form): Form<EditForm>,
) -> Result<Reply, AppError> {
    match state.documents.update(&filename, form.content.as_bytes()).await {
        Ok(name) => Ok(Reply::found(session.with_message(format!("{name} has been updated.")), "/")),
        Err(err) => missing(session, err, Reply::found),
    }
}

/// `POST /{filename}/delete`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(filename): Path<String>,
) -> Result<Reply, AppError> {
    match state.documents.delete(&filename).await {
        Ok(name) => Ok(Reply::found(session.with_message(format!("{name} has been deleted.")), "/")),
        Err(err) => missing(session, err, Reply::found),
    }
}

/// Turn a not-found error into a flash and a redirect home; anything else
/// is a server error.
fn missing(
    session: Session,
    err: DocumentError,
    redirect: fn(Session, &str) -> Reply,
) -> Result<Reply, AppError> {
    match err {
        DocumentError::NotFound { .. } => {
            tracing::debug!(error = %err, "document not found");
            Ok(redirect(session.with_message(err.to_string()), "/"))
        }
        other => Err(other.into()),
    }
}
