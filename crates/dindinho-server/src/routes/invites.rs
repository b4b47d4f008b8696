//! Sending, listing and answering invites.
//!
//! Only an account's owner may share it. The recipient answers through
//! `respond`; accepting links the shared accounts the same way signup does.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use dindinho_core::entities::Invite;
use dindinho_core::enums::Permission;
use dindinho_core::errors::{DomainError, ValidationIssue};
use dindinho_db::error::DatabaseError;
use dindinho_schema::normalize_email;
use dindinho_schema::schemas::invite::{CreateInvite, InviteDecision, RespondInvite};

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, JsonBody};
use crate::state::AppState;

pub const INVITE_NOT_FOUND: &str = "Convite não encontrado";
pub const SELF_INVITE: &str = "Você não pode convidar a si mesmo";
pub const NOT_ACCOUNT_OWNER: &str = "Apenas o dono da conta pode compartilhá-la";

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody,
) -> ApiResult<(StatusCode, Json<Invite>)> {
    let input = CreateInvite::parse(&body)?;
    let sender = state.service.get_user(&user.id).await?;
    if normalize_email(&input.email) == sender.email {
        return Err(DomainError::validation(vec![ValidationIssue::new("email", SELF_INVITE, "custom")]).into());
    }

    for account in &input.accounts {
        let permission = state.service.get_permission(&account.account_id, &sender.id).await?;
        if permission != Some(Permission::Owner) {
            return Err(ApiError::forbidden(NOT_ACCOUNT_OWNER));
        }
    }

    let days = input
        .expires_in_days
        .unwrap_or(state.config.app.default_invite_ttl_days);
    let expires_at = expiry_after(Utc::now(), days)?;
    let invite = state.service.create_invite(&sender.id, &input, expires_at).await?;
    Ok((StatusCode::CREATED, Json(invite)))
}

/// Open invites addressed to the caller's current e-mail.
pub async fn pending(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<Invite>>> {
    let me = state.service.get_user(&user.id).await?;
    Ok(Json(state.service.find_pending_invites(&me.email, Utc::now(), None).await?))
}

pub async fn sent(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<Invite>>> {
    Ok(Json(state.service.list_sent_invites(&user.id).await?))
}

/// `ACCEPT` answers with the linking outcome, `REJECT` with the updated invite.
pub async fn respond(
    State(state): State<AppState>,
    user: AuthUser,
    Path(invite_id): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<Response> {
    let input = RespondInvite::parse(&body)?;
    let me = state.service.get_user(&user.id).await?;

    match input.action {
        InviteDecision::Accept => {
            let outcome = state
                .service
                .accept_invite(&invite_id, &me.id, &me.email)
                .await
                .map_err(not_found_as_invite)?;
            Ok(Json(outcome).into_response())
        }
        InviteDecision::Reject => {
            let invite = state
                .service
                .get_invite(&invite_id, None)
                .await
                .map_err(not_found_as_invite)?;
            if normalize_email(&invite.email) != me.email {
                return Err(ApiError::not_found(INVITE_NOT_FOUND));
            }
            let invite = state.service.reject_invite(&invite_id, &me.id).await?;
            Ok(Json(invite).into_response())
        }
    }
}

/// `now` plus `days`, or an internal error if the date is out of range.
fn expiry_after(now: DateTime<Utc>, days: u32) -> ApiResult<DateTime<Utc>> {
    now.checked_add_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| ApiError::Internal(format!("invite lifetime of {days} days is out of range")))
}

fn not_found_as_invite(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::NoResult => ApiError::not_found(INVITE_NOT_FOUND),
        other => other.into(),
    }
}
