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
use crate::services::taxonomy_service::{self, EditionPatch, NewEdition};

pub async fn list_editions(State(db): State<DatabaseConnection>) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::list_editions(&db).await?))
}

pub async fn get_edition(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::get_edition(&db, id).await?))
}

pub async fn editions_by_collection(
    State(db): State<DatabaseConnection>,
    Path(collection_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(taxonomy_service::editions_by_collection(&db, collection_id).await?))
}

pub async fn create_edition(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<NewEdition>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    let edition = taxonomy_service::create_edition(&db, payload).await?;
    Ok((StatusCode::CREATED, Json(edition)))
}

pub async fn update_edition(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<EditionPatch>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    Ok(Json(taxonomy_service::update_edition(&db, id, payload).await?))
}

/// Refused with 409 while the edition still has volumes
pub async fn delete_edition(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    taxonomy_service::delete_edition(&db, id).await?;
    Ok(Json(json!({ "message": "Edition deleted" })))
}
