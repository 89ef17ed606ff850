//! Handler return type that carries the updated session.
//!
//! Every handler receives the current [`Session`] from the session
//! middleware and returns a [`Reply`]: the HTTP response plus the session as
//! the handler left it. The session travels back to the middleware in the
//! response extensions, where it is persisted.

use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};

use cms_core::session::Session;

use crate::views::{self, PageContext, View};

/// A response together with the session to persist.
#[derive(Debug)]
pub struct Reply {
    session: Session,
    response: Response,
}

impl Reply {
    /// Wrap any response.
    pub fn new(session: Session, response: impl IntoResponse) -> Self {
        Self {
            session,
            response: response.into_response(),
        }
    }

    /// Render a page, consuming the session's pending flash message.
    ///
    /// `notice` is shown instead of the pending message when present; it is
    /// used for validation failures that re-render a form.
    pub fn render(
        mut session: Session,
        status: StatusCode,
        notice: Option<String>,
        view: &View<'_>,
    ) -> Self {
        let pending = session.take_message();
        let message = notice.or(pending);
        let html = views::render(
            view,
            &PageContext {
                username: session.username(),
                message: message.as_deref(),
            },
        );
        Self::new(session, (status, Html(html)))
    }

    /// `302 Found` to `location`. Used after form submissions and by the
    /// sign-in gate.
    pub fn found(session: Session, location: &str) -> Self {
        Self::new(session, found(location))
    }

    /// `303 See Other` to `location`. Used when a GET resolves to a
    /// different view.
    pub fn see_other(session: Session, location: &str) -> Self {
        Self::new(session, Redirect::to(location))
    }

    /// The session as the handler left it.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = self.response;
        response.extensions_mut().insert(self.session);
        response
    }
}

/// Build a bare `302 Found` response.
fn found(location: &str) -> Response {
    match HeaderValue::try_from(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::error!(location = %location, "invalid redirect location");
            (StatusCode::FOUND, [(LOCATION, HeaderValue::from_static("/"))]).into_response()
        }
    }
}
