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
use crate::services::taxonomy_service::{self, TagInput};

pub async fn list_tags(State(db): State<DatabaseConnection>) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::list_tags(&db).await?))
}

pub async fn tags_with_count(State(db): State<DatabaseConnection>) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::tags_with_count(&db).await?))
}

pub async fn get_tag(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::get_tag(&db, id).await?))
}

pub async fn tags_with_collections(
    State(db): State<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::tags_with_collections(&db).await?))
}

pub async fn get_tag_collections(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::tag_collections(&db, id).await?))
}

pub async fn create_tag(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<TagInput>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    let tag = taxonomy_service::create_tag(&db, payload).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn update_tag(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<TagInput>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    Ok(Json(taxonomy_service::update_tag(&db, id, payload).await?))
}

pub async fn delete_tag(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    taxonomy_service::delete_tag(&db, id).await?;
    Ok(Json(json!({ "message": "Tag deleted" })))
}
