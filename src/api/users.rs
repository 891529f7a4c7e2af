//! User profile and admin user management handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::error::{require_admin, ApiResult};
use crate::auth::Claims;
use crate::domain::{DomainError, UserPatch};
use crate::infrastructure::AppState;
use crate::models::user;
use crate::services::catalog_service::validate_date;
use crate::services::library_service;

async fn patch_user(state: &AppState, id: i32, patch: UserPatch) -> ApiResult<user::Model> {
    validate_date("dateOfBirth", patch.date_of_birth.as_deref())?;
    let current = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("User"))?;

    Ok(state.user_repo.update(patch.apply(current)).await?)
}

pub async fn get_me(State(state): State<AppState>, claims: Claims) -> ApiResult<impl IntoResponse> {
    let profile = state
        .user_repo
        .find_profile(claims.user_id())
        .await?
        .ok_or(DomainError::NotFound("User"))?;
    Ok(Json(profile))
}

pub async fn update_me(
    State(state): State<AppState>,
    claims: Claims,
    Json(mut payload): Json<UserPatch>,
) -> ApiResult<impl IntoResponse> {
    // Users cannot promote themselves
    payload.role = None;
    Ok(Json(patch_user(&state, claims.user_id(), payload).await?))
}

pub async fn delete_me(
    State(state): State<AppState>,
    claims: Claims,
) -> ApiResult<impl IntoResponse> {
    library_service::delete_user(&state, claims.user_id()).await?;
    Ok(Json(json!({ "message": "User deleted" })))
}

pub async fn list_users(
    State(state): State<AppState>,
    claims: Claims,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    Ok(Json(state.user_repo.find_all().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    let profile = state
        .user_repo
        .find_profile(id)
        .await?
        .ok_or(DomainError::NotFound("User"))?;
    Ok(Json(profile))
}

pub async fn update_user(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<UserPatch>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    Ok(Json(patch_user(&state, id, payload).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    library_service::delete_user(&state, id).await?;
    Ok(Json(json!({ "message": "User deleted" })))
}
