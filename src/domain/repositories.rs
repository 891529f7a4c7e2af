//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::Deserialize;

use super::pagination::PageWindow;
use super::slug::resolve_slug;
use super::views::{CollectionDetail, UserProfile, VolumeFetch, VolumeView};
use super::DomainError;
use crate::models::{collection, library, user, volume, Role};

/// Sort applied to collection listings
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOrder {
    #[default]
    Id,
    NewestRelease,
}

/// Filter criteria for collection queries.
///
/// Every set field narrows the result. Count and page queries built from
/// the same filter always share one predicate.
#[derive(Debug, Default, Clone)]
pub struct CollectionFilter {
    /// Case-sensitive title prefix
    pub title_prefix: Option<String>,
    pub category_slug: Option<String>,
    /// Category name membership (IN list)
    pub category_names: Option<Vec<String>>,
    pub order: CollectionOrder,
}

/// Input for creating a collection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollection {
    pub title: String,
    pub image: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub is_finish: bool,
    #[serde(default = "default_visibility")]
    pub visibility: bool,
    pub resume: Option<String>,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    pub editor_id: Option<i32>,
    #[serde(default)]
    pub tags_id: Vec<i32>,
}

/// Partial update of a collection. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPatch {
    pub title: Option<String>,
    pub image: Option<String>,
    pub release_date: Option<String>,
    pub is_finish: Option<bool>,
    pub visibility: Option<bool>,
    pub resume: Option<String>,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    pub editor_id: Option<i32>,
    /// Added to the tags already attached
    pub tags_id: Option<Vec<i32>>,
}

impl CollectionPatch {
    /// Builds the stored value resulting from this patch.
    pub fn apply(self, current: collection::Model) -> collection::Model {
        let slug = resolve_slug(&current.title, &current.slug, self.title.as_deref());
        collection::Model {
            id: current.id,
            title: self.title.unwrap_or(current.title),
            slug,
            image: self.image.or(current.image),
            release_date: self.release_date.or(current.release_date),
            create_date: current.create_date,
            is_finish: self.is_finish.unwrap_or(current.is_finish),
            visibility: self.visibility.unwrap_or(current.visibility),
            resume: self.resume.or(current.resume),
            follow_number: current.follow_number,
            author_id: self.author_id.or(current.author_id),
            category_id: self.category_id.or(current.category_id),
            editor_id: self.editor_id.or(current.editor_id),
        }
    }
}

/// Input for creating a volume
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVolume {
    pub title: String,
    pub number: i32,
    pub release_date: Option<String>,
    pub image: Option<String>,
    pub resume: Option<String>,
    pub nbr_pages: Option<i32>,
    pub price: Option<f64>,
    #[serde(default = "default_visibility")]
    pub visibility: bool,
    pub edition_id: i32,
}

/// Partial update of a volume. The follow counter is not client-writable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumePatch {
    pub title: Option<String>,
    pub number: Option<i32>,
    pub release_date: Option<String>,
    pub image: Option<String>,
    pub resume: Option<String>,
    pub nbr_pages: Option<i32>,
    pub price: Option<f64>,
    pub visibility: Option<bool>,
    pub edition_id: Option<i32>,
}

impl VolumePatch {
    pub fn apply(self, current: volume::Model) -> volume::Model {
        let slug = resolve_slug(&current.title, &current.slug, self.title.as_deref());
        volume::Model {
            id: current.id,
            title: self.title.unwrap_or(current.title),
            slug,
            number: self.number.unwrap_or(current.number),
            release_date: self.release_date.or(current.release_date),
            create_date: current.create_date,
            image: self.image.or(current.image),
            resume: self.resume.or(current.resume),
            nbr_pages: self.nbr_pages.or(current.nbr_pages),
            price: self.price.or(current.price),
            visibility: self.visibility.unwrap_or(current.visibility),
            follow_number: current.follow_number,
            edition_id: self.edition_id.unwrap_or(current.edition_id),
        }
    }
}

/// Input for creating a user. The password arrives already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub picture: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub role: Role,
}

/// Partial update of a user profile.
///
/// Counters are not patchable; library events move them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    /// Honored only on admin routes
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn apply(self, current: user::Model) -> user::Model {
        user::Model {
            name: self.name.or(current.name),
            surname: self.surname.or(current.surname),
            email: self.email.unwrap_or(current.email),
            picture: self.picture.or(current.picture),
            date_of_birth: self.date_of_birth.or(current.date_of_birth),
            gender: self.gender.or(current.gender),
            role: self.role.unwrap_or(current.role),
            ..current
        }
    }
}

fn default_visibility() -> bool {
    true
}

/// Signed adjustments to the derived counters of one library event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    /// Applied to `volumes.follow_number`
    pub follow_number: i32,
    /// Applied to `users.count_volume`
    pub count_volume: i32,
    /// Applied to `users.count_volume_read`
    pub count_volume_read: i32,
}

impl CounterDelta {
    pub fn touches_volume(&self) -> bool {
        self.follow_number != 0
    }

    pub fn touches_user(&self) -> bool {
        self.count_volume != 0 || self.count_volume_read != 0
    }
}

/// Row-level change of a library event
#[derive(Debug, Clone)]
pub enum LibraryChange {
    Insert {
        volume_id: i32,
        user_id: i32,
        is_read: bool,
    },
    SetRead {
        entry: library::Model,
        is_read: bool,
    },
    Remove {
        entry: library::Model,
    },
}

impl LibraryChange {
    pub fn volume_id(&self) -> i32 {
        match self {
            LibraryChange::Insert { volume_id, .. } => *volume_id,
            LibraryChange::SetRead { entry, .. } | LibraryChange::Remove { entry } => entry.volume_id,
        }
    }

    pub fn user_id(&self) -> i32 {
        match self {
            LibraryChange::Insert { user_id, .. } => *user_id,
            LibraryChange::SetRead { entry, .. } | LibraryChange::Remove { entry } => entry.user_id,
        }
    }
}

/// Repository trait for Collection entity
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<collection::Model>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<collection::Model>, DomainError>;

    /// Collection with its taxonomy, tags, and editions (each capped to its first volumes)
    async fn find_detail_by_slug(&self, slug: &str) -> Result<Option<CollectionDetail>, DomainError>;

    /// Number of collections matching the filter
    async fn count(&self, filter: &CollectionFilter) -> Result<u64, DomainError>;

    /// One window of the collections matching the filter
    async fn find_window(
        &self,
        filter: &CollectionFilter,
        window: &PageWindow,
    ) -> Result<Vec<collection::Model>, DomainError>;

    /// Distinct category names of the collections whose title starts with `title_prefix`, sorted
    async fn category_names_for_title(&self, title_prefix: &str) -> Result<Vec<String>, DomainError>;

    async fn create(&self, input: NewCollection) -> Result<collection::Model, DomainError>;

    /// Persists a patched collection and attaches `extra_tags`
    async fn update(
        &self,
        collection: collection::Model,
        extra_tags: Vec<i32>,
    ) -> Result<collection::Model, DomainError>;

    /// Fails with `Conflict` while editions still reference the collection
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for Volume entity
#[async_trait]
pub trait VolumeRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<volume::Model>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<volume::Model>, DomainError>;

    /// Volumes of the edition `edition_slug` of collection `collection_slug`
    async fn count_in_edition(
        &self,
        collection_slug: &str,
        edition_slug: &str,
    ) -> Result<u64, DomainError>;

    /// One window of an edition's volumes, by tome number
    async fn find_window_in_edition(
        &self,
        collection_slug: &str,
        edition_slug: &str,
        window: &PageWindow,
    ) -> Result<Vec<volume::Model>, DomainError>;

    async fn find_in_edition_by_number(
        &self,
        collection_slug: &str,
        edition_slug: &str,
        number: i32,
    ) -> Result<Option<volume::Model>, DomainError>;

    /// Most recent releases first
    async fn find_newest(&self, limit: u64) -> Result<Vec<volume::Model>, DomainError>;

    /// Most followed first
    async fn find_popular(&self, limit: u64) -> Result<Vec<volume::Model>, DomainError>;

    /// Resolves each volume's ancestors up to `fetch`, preserving order
    async fn load_context(
        &self,
        volumes: Vec<volume::Model>,
        fetch: VolumeFetch,
    ) -> Result<Vec<VolumeView>, DomainError>;

    async fn create(&self, input: NewVolume) -> Result<volume::Model, DomainError>;

    async fn update(&self, volume: volume::Model) -> Result<volume::Model, DomainError>;

    /// Removes the row only. Library entries must be released first.
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for Library entries.
///
/// Counter columns on volumes and users are written exclusively through
/// [`LibraryRepository::commit`].
#[async_trait]
pub trait LibraryRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<library::Model>, DomainError>;

    /// First entry of `user_id` for `volume_id`, if any
    async fn find_for(&self, volume_id: i32, user_id: i32)
    -> Result<Option<library::Model>, DomainError>;

    async fn find_by_user(&self, user_id: i32) -> Result<Vec<library::Model>, DomainError>;

    async fn find_by_volume(&self, volume_id: i32) -> Result<Vec<library::Model>, DomainError>;

    /// Applies the row change and `delta` in one transaction. Updates and
    /// removals are guarded on the entry's read flag and fail with `Conflict`
    /// when it changed since the entry was read. Returns the entry as stored,
    /// or `None` on removal.
    async fn commit(
        &self,
        change: LibraryChange,
        delta: CounterDelta,
    ) -> Result<Option<library::Model>, DomainError>;
}

/// Repository trait for User entity and its wish list
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<user::Model>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DomainError>;

    /// Fails with `Conflict` when the email is taken
    async fn create(&self, input: NewUser) -> Result<user::Model, DomainError>;

    async fn update(&self, user: user::Model) -> Result<user::Model, DomainError>;

    /// Removes the row only. Library entries must be released first.
    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    async fn wish_list_contains(&self, user_id: i32, volume_id: i32) -> Result<bool, DomainError>;

    /// No-op when already present
    async fn add_to_wish_list(&self, user_id: i32, volume_id: i32) -> Result<(), DomainError>;

    /// No-op when absent
    async fn remove_from_wish_list(&self, user_id: i32, volume_id: i32) -> Result<(), DomainError>;

    async fn wish_list(&self, user_id: i32) -> Result<Vec<volume::Model>, DomainError>;

    /// User with wish list and library entries, volumes resolved up to their collection
    async fn find_profile(&self, user_id: i32) -> Result<Option<UserProfile>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_piece() -> collection::Model {
        collection::Model {
            id: 1,
            title: "One Piece".into(),
            slug: "one-piece".into(),
            image: None,
            release_date: Some("1997-07-22".into()),
            create_date: "2024-01-01".into(),
            is_finish: false,
            visibility: true,
            resume: None,
            follow_number: 12,
            author_id: Some(3),
            category_id: None,
            editor_id: None,
        }
    }

    #[test]
    fn test_collection_patch_keeps_absent_fields() {
        let patched = CollectionPatch {
            is_finish: Some(true),
            ..Default::default()
        }
        .apply(one_piece());

        assert!(patched.is_finish);
        assert_eq!(patched.slug, "one-piece");
        assert_eq!(patched.author_id, Some(3));
        assert_eq!(patched.follow_number, 12);
    }

    #[test]
    fn test_collection_patch_recomputes_slug_on_rename() {
        let patched = CollectionPatch {
            title: Some("One Piece Deluxe".into()),
            ..Default::default()
        }
        .apply(one_piece());

        assert_eq!(patched.title, "One Piece Deluxe");
        assert_eq!(patched.slug, "one-piece-deluxe");
    }

    #[test]
    fn test_counter_delta_targets() {
        let toggle = CounterDelta {
            count_volume_read: 1,
            ..Default::default()
        };
        assert!(!toggle.touches_volume());
        assert!(toggle.touches_user());
        assert!(!CounterDelta::default().touches_user());
    }
}
