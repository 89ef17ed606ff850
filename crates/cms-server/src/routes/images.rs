//! Image routes: upload, view, and delete.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::Extension;

use cms_core::error::ImageError;
use cms_core::session::Session;

use crate::error::AppError;
use crate::reply::Reply;
use crate::state::AppState;
use crate::views::View;

/// Multipart field holding the uploaded file.
const UPLOAD_FIELD: &str = "image";

/// `GET /images/upload`
pub async fn upload_form(Extension(session): Extension<Session>) -> Reply {
    Reply::render(session, StatusCode::OK, None, &View::UploadImage)
}

/// `POST /images/upload`: store the uploaded file under its original name.
///
/// The file is spooled to a temporary file first and then copied into the
/// image store.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> Result<Reply, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let original = field.file_name().unwrap_or_default().to_owned();
        let bytes = field.bytes().await?;

        let temp = tempfile::NamedTempFile::new()?;
        tokio::fs::write(temp.path(), &bytes).await?;
        upload = Some((original, temp));
    }

    let result = match &upload {
        Some((original, temp)) => state.images.upload(original, temp.path()).await,
        None => Err(ImageError::NoFile),
    };

    match result {
        Ok(name) => Ok(Reply::found(
            session.with_message(format!("{name} successfully uploaded.")),
            "/",
        )),
        Err(err @ (ImageError::NoFile | ImageError::NotRecognized { .. })) => Ok(Reply::render(
            session,
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(err.to_string()),
            &View::UploadImage,
        )),
        Err(err) => Err(err.into()),
    }
}

/// `GET /images/{filename}`: serve the image bytes.
pub async fn show(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(filename): Path<String>,
) -> Result<Reply, AppError> {
    match state.images.get(&filename).await {
        Ok(image) => Ok(Reply::new(
            session,
            ([(CONTENT_TYPE, image.kind.content_type)], image.content),
        )),
        Err(err @ (ImageError::NotFound { .. } | ImageError::NotRecognized { .. })) => {
            Ok(Reply::found(session.with_message(err.to_string()), "/"))
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /images/{filename}/delete`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(filename): Path<String>,
) -> Result<Reply, AppError> {
    match state.images.delete(&filename).await {
        Ok(name) => Ok(Reply::found(session.with_message(format!("{name} has been deleted.")), "/")),
        Err(err @ ImageError::NotFound { .. }) => {
            Ok(Reply::found(session.with_message(err.to_string()), "/"))
        }
        Err(err) => Err(err.into()),
    }
}
