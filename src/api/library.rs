//! Personal library handlers. Every route acts on behalf of the token's user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::error::ApiResult;
use crate::auth::Claims;
use crate::infrastructure::AppState;
use crate::services::library_service;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    volume_id: i32,
    #[serde(default)]
    is_read: bool,
}

pub async fn create_entry(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateEntryRequest>,
) -> ApiResult<impl IntoResponse> {
    let entry = library_service::create_entry(
        &state,
        payload.volume_id,
        claims.user_id(),
        payload.is_read,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn toggle_read(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let entry = library_service::toggle_read(&state, id, claims.user_id()).await?;
    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    library_service::delete_entry(&state, id, claims.user_id()).await?;
    Ok(Json(json!({ "message": "Library entry deleted" })))
}
