//! Collection API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::error::{require_admin, ApiResult};
use super::paging::{spread, PageParams, PagedItem};
use crate::auth::Claims;
use crate::domain::{CollectionPatch, NewCollection};
use crate::infrastructure::AppState;
use crate::models::collection;
use crate::services::catalog_service;
use crate::services::search_service::{search_collections, SearchCriteria};

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub title: String,
    /// Comma-separated category names
    pub filter_category_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNameQuery {
    /// Category slug
    pub category_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySlugQuery {
    pub category_slug: String,
}

async fn run_search(
    state: &AppState,
    criteria: SearchCriteria,
    params: &PageParams,
) -> ApiResult<Json<Vec<PagedItem<collection::Model>>>> {
    let page = search_collections(
        &*state.collection_repo,
        &criteria,
        params.request(state.default_page_size),
    )
    .await?;
    Ok(Json(spread(page)))
}

pub async fn list_collections(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let collections = catalog_service::list_collections(&state).await?;
    Ok(Json(collections))
}

#[utoipa::path(
    get,
    path = "/api/collections/search",
    params(PageParams, ("title" = String, Query, description = "Case-sensitive title prefix")),
    responses(
        (status = 200, description = "Matching collections, each with totalPages, count, pageNumber and categoriesFound"),
        (status = 400, description = "Invalid page size")
    )
)]
pub async fn search_by_title(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(query): Query<TitleQuery>,
) -> ApiResult<impl IntoResponse> {
    run_search(&state, SearchCriteria::TitlePrefix(query.title), &params).await
}

#[utoipa::path(
    get,
    path = "/api/collections/search/filter",
    params(
        PageParams,
        ("title" = String, Query, description = "Case-sensitive title prefix"),
        ("filterCategoryName" = String, Query, description = "Comma-separated category names")
    ),
    responses((status = 200, description = "Matching collections in the given categories"))
)]
pub async fn search_filtered(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<impl IntoResponse> {
    let criteria = SearchCriteria::title_in_categories(query.title, &query.filter_category_name);
    run_search(&state, criteria, &params).await
}

#[utoipa::path(
    get,
    path = "/api/collections/categories/search",
    params(PageParams, ("categoryName" = String, Query, description = "Category slug")),
    responses(
        (status = 200, description = "Collections of the category; out-of-range pages are empty"),
        (status = 400, description = "Invalid page size")
    )
)]
pub async fn search_by_category(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(query): Query<CategoryNameQuery>,
) -> ApiResult<impl IntoResponse> {
    run_search(&state, SearchCriteria::CategorySlug(query.category_name), &params).await
}

#[utoipa::path(
    get,
    path = "/api/collections/category",
    params(PageParams, ("categorySlug" = String, Query, description = "Category slug")),
    responses((status = 200, description = "Category carousel; out-of-range pages wrap around"))
)]
pub async fn category_carousel(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(query): Query<CategorySlugQuery>,
) -> ApiResult<impl IntoResponse> {
    run_search(
        &state,
        SearchCriteria::CarouselCategory(query.category_slug),
        &params,
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/collections/newest",
    params(PageParams),
    responses((status = 200, description = "Latest releases; out-of-range pages wrap around"))
)]
pub async fn newest_collections(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<impl IntoResponse> {
    run_search(&state, SearchCriteria::Newest, &params).await
}

#[utoipa::path(
    get,
    path = "/api/collections/by-slug/{slug}",
    params(("slug" = String, Path, description = "Collection slug")),
    responses(
        (status = 200, description = "Collection with author, category, editor, tags and editions"),
        (status = 404, description = "No collection with this slug")
    )
)]
pub async fn get_collection_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let detail = catalog_service::collection_detail(&state, &slug).await?;
    Ok(Json(detail))
}

pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let collection = catalog_service::get_collection(&state, id).await?;
    Ok(Json(collection))
}

pub async fn create_collection(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<NewCollection>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    let created = catalog_service::create_collection(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_collection(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<CollectionPatch>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    let updated = catalog_service::update_collection(&state, id, payload).await?;
    Ok(Json(updated))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    catalog_service::delete_collection(&state, id).await?;
    Ok(Json(json!({ "message": "Collection deleted" })))
}
