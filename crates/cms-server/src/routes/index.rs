//! Home page: document and image listings.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use cms_core::session::Session;

use crate::error::AppError;
use crate::reply::Reply;
use crate::state::AppState;
use crate::views::View;

/// `GET /`: list documents and, when enabled, images.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Reply, AppError> {
    let documents = state.documents.list().await?;
    let images = if state.enable_images {
        Some(state.images.list().await?)
    } else {
        None
    };

    Ok(Reply::render(
        session,
        StatusCode::OK,
        None,
        &View::Index {
            documents: &documents,
            images: images.as_deref(),
        },
    ))
}
