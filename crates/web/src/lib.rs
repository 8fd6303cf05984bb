//! Bazaar web frontend library.
//!
//! Server-rendered marketplace frontend over a commerce REST backend. The
//! crate is a library so the full router can be exercised in integration
//! tests without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router with its middleware stack.
///
/// Everything except the Sentry tower layers, which only make sense in the
/// real binary.
#[must_use]
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    routes::routes(&state)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(session_layer)
        .with_state(state)
}
