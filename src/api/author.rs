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
use crate::services::taxonomy_service::{self, AuthorPatch, NewAuthor};

pub async fn list_authors(State(db): State<DatabaseConnection>) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::list_authors(&db).await?))
}

pub async fn authors_with_count(
    State(db): State<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::authors_with_count(&db).await?))
}

pub async fn get_author(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::get_author(&db, id).await?))
}

pub async fn get_author_by_slug(
    State(db): State<DatabaseConnection>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::author_by_slug(&db, &slug).await?))
}

pub async fn create_author(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<NewAuthor>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    let author = taxonomy_service::create_author(&db, payload).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn update_author(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<AuthorPatch>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    Ok(Json(taxonomy_service::update_author(&db, id, payload).await?))
}

pub async fn delete_author(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    taxonomy_service::delete_author(&db, id).await?;
    Ok(Json(json!({ "message": "Author deleted" })))
}
