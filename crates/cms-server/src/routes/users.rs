//! Account routes: sign-up, sign-in, and sign-out.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Form};
use serde::Deserialize;

use cms_core::error::CredentialError;
use cms_core::session::Session;

use crate::error::AppError;
use crate::reply::Reply;
use crate::state::AppState;
use crate::views::View;

/// Submitted sign-up or sign-in form.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// `GET /users/signup`
pub async fn signup_form(Extension(session): Extension<Session>) -> Reply {
    Reply::render(session, StatusCode::OK, None, &View::SignUp { username: "" })
}

/// `POST /users/signup`: register a new account.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Form(form): Form<CredentialsForm>,
) -> Result<Reply, AppError> {
    match state.credentials.register(&form.username, &form.password).await {
        Ok(_) => Ok(Reply::found(
            session.with_message("Account created. Please sign in."),
            "/users/signin",
        )),
        Err(err) if err.is_validation() => Ok(rejected_signup(session, &err, &form.username)),
        Err(err) => Err(err.into()),
    }
}

fn rejected_signup(session: Session, err: &CredentialError, username: &str) -> Reply {
    Reply::render(
        session,
        StatusCode::UNPROCESSABLE_ENTITY,
        Some(err.to_string()),
        &View::SignUp { username },
    )
}

/// `GET /users/signin`
pub async fn signin_form(Extension(session): Extension<Session>) -> Reply {
    Reply::render(session, StatusCode::OK, None, &View::SignIn { username: "" })
}

/// `POST /users/signin`: check credentials and sign in.
pub async fn signin(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
    Form(form): Form<CredentialsForm>,
) -> Result<Reply, AppError> {
    if state.credentials.authenticate(&form.username, &form.password).await? {
        tracing::info!(username = %form.username, "signed in");
        session.sign_in(form.username);
        return Ok(Reply::found(session.with_message("Welcome!"), "/"));
    }

    Ok(Reply::render(
        session,
        StatusCode::UNPROCESSABLE_ENTITY,
        Some("Invalid credentials".to_owned()),
        &View::SignIn {
            username: &form.username,
        },
    ))
}

/// `POST /users/signout`: forget the signed-in user.
pub async fn signout(Extension(mut session): Extension<Session>) -> Reply {
    if let Some(username) = session.username() {
        tracing::info!(username = %username, "signed out");
    }
    session.sign_out();
    Reply::found(session.with_message("You have been signed out."), "/")
}
