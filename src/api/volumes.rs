//! Volume API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::error::{require_admin, ApiResult};
use super::paging::{spread, PageParams};
use crate::auth::Claims;
use crate::domain::{NewVolume, VolumePatch};
use crate::infrastructure::AppState;
use crate::services::{catalog_service, library_service, search_service};

pub async fn list_volumes(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(catalog_service::list_volumes(&state).await?))
}

pub async fn newest_volumes(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(catalog_service::newest_volumes(&state).await?))
}

pub async fn popular_volumes(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(catalog_service::popular_volumes(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/volumes/edition/{collection}/{edition}",
    params(
        PageParams,
        ("collection" = String, Path, description = "Collection slug"),
        ("edition" = String, Path, description = "Edition slug")
    ),
    responses((status = 200, description = "Volumes by tome number, each with totalPages, count and pageNumber"))
)]
pub async fn volumes_by_edition(
    State(state): State<AppState>,
    Path((collection_slug, edition_slug)): Path<(String, String)>,
    Query(params): Query<PageParams>,
) -> ApiResult<impl IntoResponse> {
    let page = search_service::volumes_in_edition(
        &*state.volume_repo,
        &collection_slug,
        &edition_slug,
        params.request(state.default_page_size),
    )
    .await?;
    Ok(Json(spread(page)))
}

pub async fn volume_detail(
    State(state): State<AppState>,
    Path((collection_slug, edition_slug, number)): Path<(String, String, i32)>,
) -> ApiResult<impl IntoResponse> {
    let detail =
        catalog_service::volume_detail(&state, &collection_slug, &edition_slug, number, None)
            .await?;
    Ok(Json(detail))
}

/// Same as [`volume_detail`], with the caller's library and wish list state
pub async fn volume_detail_connected(
    State(state): State<AppState>,
    claims: Claims,
    Path((collection_slug, edition_slug, number)): Path<(String, String, i32)>,
) -> ApiResult<impl IntoResponse> {
    let detail = catalog_service::volume_detail(
        &state,
        &collection_slug,
        &edition_slug,
        number,
        Some(claims.user_id()),
    )
    .await?;
    Ok(Json(detail))
}

pub async fn get_volume(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(catalog_service::get_volume(&state, id).await?))
}

pub async fn create_volume(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<NewVolume>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    let created = catalog_service::create_volume(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_volume(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<VolumePatch>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    Ok(Json(catalog_service::update_volume(&state, id, payload).await?))
}

pub async fn delete_volume(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    catalog_service::delete_volume(&state, id).await?;
    Ok(Json(json!({ "message": "Volume deleted" })))
}

pub async fn add_to_wish_list(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    library_service::add_to_wish_list(&state, claims.user_id(), id).await?;
    Ok(Json(json!({ "volumeId": id, "volumeInWishList": true })))
}

pub async fn remove_from_wish_list(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    library_service::remove_from_wish_list(&state, claims.user_id(), id).await?;
    Ok(Json(json!({ "volumeId": id, "volumeInWishList": false })))
}
