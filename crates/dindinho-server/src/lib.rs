//! # dindinho-server
//!
//! axum HTTP surface for Dindinho: health checks, signup/login with invite
//! auto-link, accounts and invites. Every error leaves as an
//! `ApiErrorEnvelope`.

pub mod auth;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
pub use crate::state::AppState;

/// The full application with middleware, ready to serve.
pub fn app(state: AppState) -> Router {
    routes::router()
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn fallback() -> ApiError {
    ApiError::not_found("Rota não encontrada")
}
