use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use super::error::{require_admin, ApiResult};
use crate::auth::Claims;
use crate::services::taxonomy_service::{self, EditorPatch, NewEditor};

pub async fn list_editors(State(db): State<DatabaseConnection>) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::list_editors(&db).await?))
}

pub async fn editors_with_count(
    State(db): State<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::editors_with_count(&db).await?))
}

pub async fn get_editor(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::get_editor(&db, id).await?))
}

/// Editor with the collections it publishes
pub async fn get_editor_by_slug(
    State(db): State<DatabaseConnection>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::editor_by_slug(&db, &slug).await?))
}

pub async fn get_editor_collections(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::editor_collections(&db, id).await?))
}

pub async fn create_editor(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<NewEditor>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    let editor = taxonomy_service::create_editor(&db, payload).await?;
    Ok((StatusCode::CREATED, Json(editor)))
}

pub async fn update_editor(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<EditorPatch>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    Ok(Json(taxonomy_service::update_editor(&db, id, payload).await?))
}

pub async fn delete_editor(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    taxonomy_service::delete_editor(&db, id).await?;
    Ok(Json(json!({ "message": "Editor deleted" })))
}
