//! Read models assembled from several entities.
//!
//! Relations are resolved by id lookup and nested by value here; entities
//! never hold references to each other.

use serde::{Serialize, Serializer};

use crate::models::{author, category, collection, edition, editor, library, tag, user, volume};

/// How far up the hierarchy a volume listing eager-loads.
///
/// Each level includes the previous ones:
/// `Edition` loads the edition, `Collection` adds the edition's collection,
/// `Contributors` adds the collection's author and editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VolumeFetch {
    Bare,
    Edition,
    Collection,
    Contributors,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionContext {
    #[serde(flatten)]
    pub collection: collection::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<author::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<editor::Model>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditionContext {
    #[serde(flatten)]
    pub edition: edition::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionContext>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeView {
    #[serde(flatten)]
    pub volume: volume::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<EditionContext>,
}

impl From<volume::Model> for VolumeView {
    fn from(volume: volume::Model) -> Self {
        Self {
            volume,
            edition: None,
        }
    }
}

/// Serialized as `false` when the volume is not owned, otherwise as the
/// library entry id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryMembership(pub Option<i32>);

impl Serialize for LibraryMembership {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            Some(id) => serializer.serialize_i32(id),
            None => serializer.serialize_bool(false),
        }
    }
}

/// Single volume page, with the per-user flags filled in when a user is known.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeDetail {
    #[serde(flatten)]
    pub view: VolumeView,
    pub volumes_count: u64,
    pub volume_in_library: LibraryMembership,
    pub volume_in_wish_list: bool,
    pub volume_is_read: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditionWithVolumes {
    #[serde(flatten)]
    pub edition: edition::Model,
    /// First volumes by tome number, capped.
    pub volumes: Vec<volume::Model>,
    /// Total volumes in the edition, regardless of the cap.
    pub volumes_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub collection: collection::Model,
    pub author: Option<author::Model>,
    pub editor: Option<editor::Model>,
    pub category: Option<category::Model>,
    pub editions: Vec<EditionWithVolumes>,
    pub tags: Vec<tag::Model>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntryView {
    #[serde(flatten)]
    pub entry: library::Model,
    pub volume: VolumeView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: user::Model,
    pub wish_list: Vec<VolumeView>,
    pub libraries: Vec<LibraryEntryView>,
}
