//! Welcome, liveness and database diagnostic endpoints. None require auth.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{SecondsFormat, Utc};
use dindinho_core::responses::{DbCheckResponse, HealthResponse, WelcomeResponse};

use crate::state::AppState;

pub async fn welcome(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Bem-vindo à {}", state.config.app.name),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        app: state.config.app.name.clone(),
    })
}

/// One read against the store. Failure is a 500 with the error text.
pub async fn test_db(State(state): State<AppState>) -> (StatusCode, Json<DbCheckResponse>) {
    match state.service.count_users().await {
        Ok(count) => (
            StatusCode::OK,
            Json(DbCheckResponse {
                success: true,
                user_count: Some(count),
                error: None,
            }),
        ),
        Err(err) => {
            tracing::error!(error = %err, "database check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DbCheckResponse {
                    success: false,
                    user_count: None,
                    error: Some(err.to_string()),
                }),
            )
        }
    }
}
