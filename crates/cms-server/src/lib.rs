//! CMS HTTP server.
//!
//! Wires the document, image, and credential stores into an Axum router
//! that serves server-rendered HTML, with cookie sessions and a sign-in gate
//! in front of every route that changes content.

pub mod config;
pub mod error;
pub mod middleware;
pub mod reply;
pub mod routes;
pub mod state;
pub mod views;
