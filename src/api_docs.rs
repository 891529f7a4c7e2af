use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::collections::search_by_title,
        api::collections::search_filtered,
        api::collections::newest_collections,
        api::collections::search_by_category,
        api::collections::category_carousel,
        api::collections::get_collection_by_slug,
        api::volumes::volumes_by_edition,
    ),
    tags(
        (name = "mangatheque", description = "Mangatheque catalog API")
    )
)]
pub struct ApiDoc;
