//! Catalog Service - collections and volumes

use chrono::NaiveDate;

use crate::domain::{
    CollectionDetail, CollectionPatch, DomainError, LibraryMembership, NewCollection, NewVolume,
    VolumeDetail, VolumeFetch, VolumePatch, VolumeView,
};
use crate::infrastructure::AppState;
use crate::models::{collection, volume};
use crate::services::library_service;

/// Size of the newest and popular volume lists
pub const HOMEPAGE_VOLUMES: u64 = 30;

/// Rejects dates that are not `YYYY-MM-DD`.
pub fn validate_date(field: &str, value: Option<&str>) -> Result<(), DomainError> {
    match value {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|_| ())
            .map_err(|_| {
                DomainError::InvalidArgument(format!("{} must be YYYY-MM-DD, got '{}'", field, raw))
            }),
        None => Ok(()),
    }
}

/// Rejects blank names and titles.
pub fn validate_name(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidArgument(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub async fn list_collections(state: &AppState) -> Result<Vec<collection::Model>, DomainError> {
    state.collection_repo.find_all().await
}

pub async fn get_collection(state: &AppState, id: i32) -> Result<collection::Model, DomainError> {
    state
        .collection_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("Collection"))
}

pub async fn collection_detail(state: &AppState, slug: &str) -> Result<CollectionDetail, DomainError> {
    state
        .collection_repo
        .find_detail_by_slug(slug)
        .await?
        .ok_or(DomainError::NotFound("Collection"))
}

pub async fn create_collection(
    state: &AppState,
    input: NewCollection,
) -> Result<collection::Model, DomainError> {
    validate_name("title", &input.title)?;
    validate_date("releaseDate", input.release_date.as_deref())?;

    let created = state.collection_repo.create(input).await?;
    tracing::info!("Collection {} created as '{}'", created.id, created.slug);
    Ok(created)
}

pub async fn update_collection(
    state: &AppState,
    id: i32,
    mut patch: CollectionPatch,
) -> Result<collection::Model, DomainError> {
    if let Some(title) = &patch.title {
        validate_name("title", title)?;
    }
    validate_date("releaseDate", patch.release_date.as_deref())?;

    let current = get_collection(state, id).await?;
    let extra_tags = patch.tags_id.take().unwrap_or_default();
    let next = patch.apply(current);

    let updated = state.collection_repo.update(next, extra_tags).await?;
    tracing::info!("Collection {} updated", updated.id);
    Ok(updated)
}

pub async fn delete_collection(state: &AppState, id: i32) -> Result<(), DomainError> {
    state.collection_repo.delete(id).await?;
    tracing::info!("Collection {} deleted", id);
    Ok(())
}

pub async fn list_volumes(state: &AppState) -> Result<Vec<volume::Model>, DomainError> {
    state.volume_repo.find_all().await
}

pub async fn get_volume(state: &AppState, id: i32) -> Result<volume::Model, DomainError> {
    state
        .volume_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("Volume"))
}

pub async fn create_volume(state: &AppState, input: NewVolume) -> Result<volume::Model, DomainError> {
    validate_name("title", &input.title)?;
    validate_date("releaseDate", input.release_date.as_deref())?;

    let created = state.volume_repo.create(input).await?;
    tracing::info!(
        "Volume {} created as tome {} of edition {}",
        created.id,
        created.number,
        created.edition_id
    );
    Ok(created)
}

pub async fn update_volume(
    state: &AppState,
    id: i32,
    patch: VolumePatch,
) -> Result<volume::Model, DomainError> {
    if let Some(title) = &patch.title {
        validate_name("title", title)?;
    }
    validate_date("releaseDate", patch.release_date.as_deref())?;

    let current = get_volume(state, id).await?;
    let updated = state.volume_repo.update(patch.apply(current)).await?;
    tracing::info!("Volume {} updated", updated.id);
    Ok(updated)
}

/// Deleting a volume also releases the library entries pointing at it.
pub async fn delete_volume(state: &AppState, id: i32) -> Result<(), DomainError> {
    library_service::delete_volume(state, id).await
}

pub async fn newest_volumes(state: &AppState) -> Result<Vec<VolumeView>, DomainError> {
    let volumes = state.volume_repo.find_newest(HOMEPAGE_VOLUMES).await?;
    state
        .volume_repo
        .load_context(volumes, VolumeFetch::Contributors)
        .await
}

pub async fn popular_volumes(state: &AppState) -> Result<Vec<VolumeView>, DomainError> {
    let volumes = state.volume_repo.find_popular(HOMEPAGE_VOLUMES).await?;
    state
        .volume_repo
        .load_context(volumes, VolumeFetch::Contributors)
        .await
}

/// Single volume page. With a `viewer`, reports their library and wish list state.
pub async fn volume_detail(
    state: &AppState,
    collection_slug: &str,
    edition_slug: &str,
    number: i32,
    viewer: Option<i32>,
) -> Result<VolumeDetail, DomainError> {
    let found = state
        .volume_repo
        .find_in_edition_by_number(collection_slug, edition_slug, number)
        .await?
        .ok_or(DomainError::NotFound("Volume"))?;
    let volume_id = found.id;

    let volumes_count = state
        .volume_repo
        .count_in_edition(collection_slug, edition_slug)
        .await?;

    let view = state
        .volume_repo
        .load_context(vec![found], VolumeFetch::Contributors)
        .await?
        .pop()
        .ok_or(DomainError::NotFound("Volume"))?;

    let mut detail = VolumeDetail {
        view,
        volumes_count,
        volume_in_library: LibraryMembership(None),
        volume_in_wish_list: false,
        volume_is_read: false,
    };

    if let Some(user_id) = viewer {
        if let Some(entry) = state.library_repo.find_for(volume_id, user_id).await? {
            detail.volume_in_library = LibraryMembership(Some(entry.id));
            detail.volume_is_read = entry.is_read;
        }
        detail.volume_in_wish_list = state
            .user_repo
            .wish_list_contains(user_id, volume_id)
            .await?;
    }

    Ok(detail)
}
