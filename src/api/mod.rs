pub mod auth;
pub mod author;
pub mod category;
pub mod collections;
pub mod editions;
pub mod editor;
pub mod error;
pub mod health;
pub mod library;
pub mod paging;
pub mod tag;
pub mod users;
pub mod volumes;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Collections
        .route(
            "/collections",
            get(collections::list_collections).post(collections::create_collection),
        )
        .route("/collections/newest", get(collections::newest_collections))
        .route("/collections/search", get(collections::search_by_title))
        .route("/collections/search/filter", get(collections::search_filtered))
        .route(
            "/collections/categories/search",
            get(collections::search_by_category),
        )
        .route("/collections/category", get(collections::category_carousel))
        .route(
            "/collections/by-slug/:slug",
            get(collections::get_collection_by_slug),
        )
        .route(
            "/collections/:id",
            get(collections::get_collection)
                .patch(collections::update_collection)
                .delete(collections::delete_collection),
        )
        // Editions
        .route(
            "/editions",
            get(editions::list_editions).post(editions::create_edition),
        )
        .route(
            "/editions/collection/:id",
            get(editions::editions_by_collection),
        )
        .route(
            "/editions/:id",
            get(editions::get_edition)
                .patch(editions::update_edition)
                .delete(editions::delete_edition),
        )
        // Volumes
        .route(
            "/volumes",
            get(volumes::list_volumes).post(volumes::create_volume),
        )
        .route("/volumes/newest", get(volumes::newest_volumes))
        .route("/volumes/popular", get(volumes::popular_volumes))
        .route(
            "/volumes/edition/:collection/:edition",
            get(volumes::volumes_by_edition),
        )
        .route(
            "/volumes/edition/:collection/:edition/:number",
            get(volumes::volume_detail),
        )
        .route(
            "/volumes/edition/:collection/:edition/:number/connected",
            get(volumes::volume_detail_connected),
        )
        .route(
            "/volumes/:id",
            get(volumes::get_volume)
                .patch(volumes::update_volume)
                .delete(volumes::delete_volume),
        )
        .route(
            "/volumes/:id/wishlist",
            patch(volumes::add_to_wish_list).delete(volumes::remove_from_wish_list),
        )
        // Personal library
        .route("/library", post(library::create_entry))
        .route("/library/:id/read", patch(library::toggle_read))
        .route("/library/:id", delete(library::delete_entry))
        // Users
        .route(
            "/users/me",
            get(users::get_me)
                .patch(users::update_me)
                .delete(users::delete_me),
        )
        .route("/users", get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        // Authors
        .route(
            "/authors",
            get(author::list_authors).post(author::create_author),
        )
        .route("/authors/with-count", get(author::authors_with_count))
        .route("/authors/slug/:slug", get(author::get_author_by_slug))
        .route(
            "/authors/:id",
            get(author::get_author)
                .patch(author::update_author)
                .delete(author::delete_author),
        )
        // Categories
        .route(
            "/categories",
            get(category::list_categories).post(category::create_category),
        )
        .route("/categories/with-count", get(category::categories_with_count))
        .route("/categories/slug/:slug", get(category::get_category_by_slug))
        .route(
            "/categories/:id/collections",
            get(category::get_category_collections),
        )
        .route(
            "/categories/:id",
            get(category::get_category)
                .patch(category::update_category)
                .delete(category::delete_category),
        )
        // Editors
        .route(
            "/editors",
            get(editor::list_editors).post(editor::create_editor),
        )
        .route("/editors/with-count", get(editor::editors_with_count))
        .route("/editors/slug/:slug", get(editor::get_editor_by_slug))
        .route("/editors/:id/collections", get(editor::get_editor_collections))
        .route(
            "/editors/:id",
            get(editor::get_editor)
                .patch(editor::update_editor)
                .delete(editor::delete_editor),
        )
        // Tags
        .route("/tags", get(tag::list_tags).post(tag::create_tag))
        .route("/tags/with-count", get(tag::tags_with_count))
        .route("/tags/collections", get(tag::tags_with_collections))
        .route("/tags/:id/collections", get(tag::get_tag_collections))
        .route(
            "/tags/:id",
            get(tag::get_tag)
                .patch(tag::update_tag)
                .delete(tag::delete_tag),
        )
        .with_state(state)
}
