//! HTTP route table.
//!
//! Reading is public; every route that changes content sits behind
//! [`require_sign_in`]. Image routes are only mounted when image support is
//! enabled.

pub mod documents;
pub mod images;
pub mod index;
pub mod users;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use tower::limit::GlobalConcurrencyLimitLayer;

use crate::middleware::{require_sign_in, session_middleware};
use crate::state::AppState;

/// Build the application router with session handling attached.
pub fn router(state: Arc<AppState>) -> Router {
    let mut gated = Router::new()
        .route("/new", get(documents::new_form))
        .route("/create", post(documents::create))
        .route("/duplicate", post(documents::duplicate))
        .route("/{filename}/duplicate", get(documents::duplicate_form))
        .route("/{filename}/edit", get(documents::edit_form))
        .route("/{filename}/delete", post(documents::delete));

    if state.enable_images {
        gated = gated
            .route("/images/upload", get(images::upload_form).post(images::upload))
            .route("/images/{filename}/delete", post(images::delete));
    }
    let gated = gated.route_layer(from_fn(require_sign_in));

    // One semaphore for both routes; `Router::layer` clones the layer per route.
    let credentials = Router::new()
        .route("/users/signup", get(users::signup_form).post(users::signup))
        .route("/users/signin", get(users::signin_form).post(users::signin))
        .layer(GlobalConcurrencyLimitLayer::with_semaphore(Arc::clone(
            &state.credential_permits,
        )));

    let mut public = Router::new()
        .route("/", get(index::index))
        .route("/users/signout", post(users::signout))
        .route(
            "/{filename}",
            get(documents::show).merge(post(documents::update).route_layer(from_fn(require_sign_in))),
        )
        .merge(credentials);

    if state.enable_images {
        public = public.route("/images/{filename}", get(images::show));
    }

    public
        .merge(gated)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(from_fn_with_state(Arc::clone(&state), session_middleware))
        .with_state(state)
}
