//! HTTP middleware for sessions and the sign-in gate.
//!
//! [`session_middleware`] wraps the whole router: it resolves the session
//! cookie to a [`Session`], hands it to the handler through the request
//! extensions, and stores whatever session the handler returns.
//!
//! [`require_sign_in`] is applied with `route_layer` to the routes that
//! change content. Anonymous requests are redirected home with a flash
//! before the handler runs.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use cms_core::session::Session;

use crate::reply::Reply;
use crate::state::AppState;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "cms_session";

/// Flash shown when an anonymous client hits a gated route.
pub const SIGN_IN_REQUIRED: &str = "You must be signed in to do that.";

/// Load the session for this request and persist the one the handler returns.
///
/// A session id is only issued once there is something to remember, and it
/// is dropped again as soon as the session is back to anonymous with no
/// pending flash. Signing in always moves the session to a fresh id.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = match jar.get(SESSION_COOKIE) {
        Some(cookie) => {
            let id = cookie.value().to_owned();
            state.sessions.load(&id).await.map(|session| (id, session))
        }
        None => None,
    };

    let (id, session) = match existing {
        Some((id, session)) => (Some(id), session),
        None => (None, Session::anonymous()),
    };
    let username = session.username().map(str::to_owned);

    req.extensions_mut().insert(session);
    let mut response = next.run(req).await;

    let Some(updated) = response.extensions_mut().remove::<Session>() else {
        return response;
    };
    let secure = state.secure_cookies;

    match id {
        Some(id) if updated == Session::anonymous() => {
            state.sessions.remove(&id).await;
            (jar.remove(session_cookie(String::new(), secure)), response).into_response()
        }
        Some(id) if updated.is_signed_in() && updated.username() != username.as_deref() => {
            state.sessions.remove(&id).await;
            let id = state.sessions.start(updated).await;
            tracing::debug!("session id rotated on sign-in");
            (jar.add(session_cookie(id, secure)), response).into_response()
        }
        Some(id) => {
            state.sessions.save(&id, updated).await;
            response
        }
        None if updated == Session::anonymous() => response,
        None => {
            let id = state.sessions.start(updated).await;
            tracing::debug!("session started");
            (jar.add(session_cookie(id, secure)), response).into_response()
        }
    }
}

fn session_cookie(id: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Reject anonymous requests with a redirect home.
///
/// Runs after [`session_middleware`], which always provides the session.
pub async fn require_sign_in(
    Extension(session): Extension<Session>,
    req: Request,
    next: Next,
) -> Response {
    if session.is_signed_in() {
        return next.run(req).await;
    }

    tracing::info!(
        method = %req.method(),
        path = %req.uri().path(),
        "sign-in required"
    );
    Reply::found(session.with_message(SIGN_IN_REQUIRED), "/").into_response()
}
