//! Route table.

pub mod accounts;
pub mod auth;
pub mod health;
pub mod invites;

use axum::Router;
use axum::routing::{get, patch, post};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health))
        .route("/test-db", get(health::test_db))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/accounts", get(accounts::list).post(accounts::create))
        .route("/api/accounts/{id}", patch(accounts::update))
        .route("/api/invites", post(invites::create))
        .route("/api/invites/pending", get(invites::pending))
        .route("/api/invites/sent", get(invites::sent))
        .route("/api/invites/{id}/respond", post(invites::respond))
}
