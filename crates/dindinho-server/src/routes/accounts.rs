use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use dindinho_core::entities::Account;
use dindinho_db::repos::account::AccountWithAccess;
use dindinho_schema::schemas::account::{CreateAccount, UpdateAccount};

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, JsonBody};
use crate::state::AppState;

pub const ACCOUNT_NOT_FOUND: &str = "Conta não encontrada";
pub const ACCOUNT_READ_ONLY: &str = "Sem permissão para editar esta conta";

pub async fn list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<AccountWithAccess>>> {
    Ok(Json(state.service.list_accounts_for_user(&user.id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody,
) -> ApiResult<(StatusCode, Json<Account>)> {
    let input = CreateAccount::parse(&body)?;
    let account = state.service.create_account(&user.id, &input).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// Viewers get 403; users without any grant get 404 so account ids do not leak.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_id): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<Json<Account>> {
    let input = UpdateAccount::parse(&body)?;
    let permission = state
        .service
        .get_permission(&account_id, &user.id)
        .await?
        .ok_or_else(|| ApiError::not_found(ACCOUNT_NOT_FOUND))?;
    if !permission.can_write() {
        return Err(ApiError::forbidden(ACCOUNT_READ_ONLY));
    }
    Ok(Json(state.service.update_account(&user.id, &account_id, &input).await?))
}
