//! Signup and login.
//!
//! Signup creates the user and links their pending invites in one
//! transaction: either both happen or neither does.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use dindinho_core::responses::AuthResponse;
use dindinho_db::error::DatabaseError;
use dindinho_db::service::DindinhoService;
use dindinho_schema::schemas::auth::{LoginInput, SignupInput};

use crate::auth::{hash_password, issue_token, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::state::AppState;

pub const INVALID_CREDENTIALS: &str = "E-mail ou senha inválidos";

pub async fn signup(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let input = SignupInput::parse(&body)?;
    let password_hash = hash_password(input.password.clone()).await?;

    let service = &state.service;
    let tx = service.begin().await?;
    let result = async {
        let user = service
            .create_user(&input.name, &input.email, &password_hash, Some(&tx))
            .await?;
        let linked = service
            .process_pending_invites(&user.id, &user.email, Some(&tx))
            .await?;
        Ok::<_, DatabaseError>((user, linked))
    }
    .await;
    let (user, linked) = DindinhoService::settle(tx, result).await?;

    tracing::info!(
        user_id = %user.id,
        linked_invites = linked.accepted_invites.len(),
        "user signed up"
    );
    let token = issue_token(&state.config.auth, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user,
            token,
            linked: Some(linked),
        }),
    ))
}

pub async fn login(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<Json<AuthResponse>> {
    let input = LoginInput::parse(&body)?;
    let credentials = state
        .service
        .find_credentials_by_email(&input.email, None)
        .await?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    if !verify_password(input.password.clone(), credentials.password_hash).await? {
        tracing::debug!(user_id = %credentials.user.id, "wrong password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = issue_token(&state.config.auth, &credentials.user)?;
    Ok(Json(AuthResponse {
        user: credentials.user,
        token,
        linked: None,
    }))
}
