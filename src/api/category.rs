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
use crate::services::taxonomy_service::{self, CategoryPatch, NewCategory};

pub async fn list_categories(
    State(db): State<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::list_categories(&db).await?))
}

pub async fn categories_with_count(
    State(db): State<DatabaseConnection>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::categories_with_count(&db).await?))
}

pub async fn get_category(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::get_category(&db, id).await?))
}

pub async fn get_category_by_slug(
    State(db): State<DatabaseConnection>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::category_by_slug(&db, &slug).await?))
}

pub async fn get_category_collections(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::category_collections(&db, id).await?))
}

pub async fn create_category(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<NewCategory>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    let category = taxonomy_service::create_category(&db, payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<CategoryPatch>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    Ok(Json(taxonomy_service::update_category(&db, id, payload).await?))
}

pub async fn delete_category(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    taxonomy_service::delete_category(&db, id).await?;
    Ok(Json(json!({ "message": "Category deleted" })))
}
