//! SeaORM implementation of VolumeRepository

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set, Unchanged,
};

use crate::domain::{
    CollectionContext, DomainError, EditionContext, NewVolume, PageWindow, VolumeFetch,
    VolumeRepository, VolumeView,
};
use crate::models::volume::{ActiveModel, Column, Entity as VolumeEntity, Relation};
use crate::models::{author, collection, edition, editor, volume};

/// SeaORM-based implementation of VolumeRepository
pub struct SeaOrmVolumeRepository {
    db: DatabaseConnection,
}

impl SeaOrmVolumeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn in_edition(collection_slug: &str, edition_slug: &str) -> Select<VolumeEntity> {
    VolumeEntity::find()
        .join(JoinType::InnerJoin, Relation::Edition.def())
        .join(JoinType::InnerJoin, edition::Relation::Collection.def())
        .filter(collection::Column::Slug.eq(collection_slug))
        .filter(edition::Column::Slug.eq(edition_slug))
}

fn distinct_ids(ids: impl Iterator<Item = i32>) -> Vec<i32> {
    ids.collect::<HashSet<_>>().into_iter().collect()
}

/// Resolves volume ancestors with one batched lookup per level.
///
/// Entities are keyed by id and nested by value, so a shared edition or
/// collection is cloned into every volume that references it.
pub(crate) async fn resolve_volume_context<C: ConnectionTrait>(
    db: &C,
    volumes: Vec<volume::Model>,
    fetch: VolumeFetch,
) -> Result<Vec<VolumeView>, DomainError> {
    if fetch == VolumeFetch::Bare || volumes.is_empty() {
        return Ok(volumes.into_iter().map(VolumeView::from).collect());
    }

    let editions: HashMap<i32, edition::Model> = edition::Entity::find()
        .filter(edition::Column::Id.is_in(distinct_ids(volumes.iter().map(|v| v.edition_id))))
        .all(db)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();

    let collections: HashMap<i32, collection::Model> = if fetch >= VolumeFetch::Collection {
        collection::Entity::find()
            .filter(
                collection::Column::Id
                    .is_in(distinct_ids(editions.values().map(|e| e.collection_id))),
            )
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect()
    } else {
        HashMap::new()
    };

    let (authors, editors): (HashMap<i32, author::Model>, HashMap<i32, editor::Model>) =
        if fetch >= VolumeFetch::Contributors {
            let authors = author::Entity::find()
                .filter(
                    author::Column::Id
                        .is_in(distinct_ids(collections.values().filter_map(|c| c.author_id))),
                )
                .all(db)
                .await?
                .into_iter()
                .map(|a| (a.id, a))
                .collect();
            let editors = editor::Entity::find()
                .filter(
                    editor::Column::Id
                        .is_in(distinct_ids(collections.values().filter_map(|c| c.editor_id))),
                )
                .all(db)
                .await?
                .into_iter()
                .map(|e| (e.id, e))
                .collect();
            (authors, editors)
        } else {
            (HashMap::new(), HashMap::new())
        };

    let views = volumes
        .into_iter()
        .map(|volume| {
            let edition = editions.get(&volume.edition_id).cloned().map(|edition| {
                let collection = collections.get(&edition.collection_id).cloned().map(|c| {
                    CollectionContext {
                        author: c.author_id.and_then(|id| authors.get(&id).cloned()),
                        editor: c.editor_id.and_then(|id| editors.get(&id).cloned()),
                        collection: c,
                    }
                });
                EditionContext {
                    edition,
                    collection,
                }
            });
            VolumeView { volume, edition }
        })
        .collect();

    Ok(views)
}

async fn ensure_edition<C: ConnectionTrait>(db: &C, edition_id: i32) -> Result<(), DomainError> {
    match edition::Entity::find_by_id(edition_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(DomainError::NotFound("Edition")),
    }
}

#[async_trait]
impl VolumeRepository for SeaOrmVolumeRepository {
    async fn find_all(&self) -> Result<Vec<volume::Model>, DomainError> {
        Ok(VolumeEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<volume::Model>, DomainError> {
        Ok(VolumeEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn count_in_edition(
        &self,
        collection_slug: &str,
        edition_slug: &str,
    ) -> Result<u64, DomainError> {
        Ok(in_edition(collection_slug, edition_slug)
            .count(&self.db)
            .await?)
    }

    async fn find_window_in_edition(
        &self,
        collection_slug: &str,
        edition_slug: &str,
        window: &PageWindow,
    ) -> Result<Vec<volume::Model>, DomainError> {
        if window.is_empty() {
            return Ok(Vec::new());
        }

        Ok(in_edition(collection_slug, edition_slug)
            .order_by_asc(Column::Number)
            .order_by_asc(Column::Id)
            .offset(window.offset)
            .limit(window.limit)
            .all(&self.db)
            .await?)
    }

    async fn find_in_edition_by_number(
        &self,
        collection_slug: &str,
        edition_slug: &str,
        number: i32,
    ) -> Result<Option<volume::Model>, DomainError> {
        Ok(in_edition(collection_slug, edition_slug)
            .filter(Column::Number.eq(number))
            .one(&self.db)
            .await?)
    }

    async fn find_newest(&self, limit: u64) -> Result<Vec<volume::Model>, DomainError> {
        Ok(VolumeEntity::find()
            .order_by_desc(Column::ReleaseDate)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    async fn find_popular(&self, limit: u64) -> Result<Vec<volume::Model>, DomainError> {
        Ok(VolumeEntity::find()
            .order_by_desc(Column::FollowNumber)
            .order_by_asc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    async fn load_context(
        &self,
        volumes: Vec<volume::Model>,
        fetch: VolumeFetch,
    ) -> Result<Vec<VolumeView>, DomainError> {
        resolve_volume_context(&self.db, volumes, fetch).await
    }

    async fn create(&self, input: NewVolume) -> Result<volume::Model, DomainError> {
        ensure_edition(&self.db, input.edition_id).await?;

        let created = ActiveModel {
            title: Set(input.title),
            number: Set(input.number),
            release_date: Set(input.release_date),
            create_date: Set(chrono::Utc::now().format("%Y-%m-%d").to_string()),
            image: Set(input.image),
            resume: Set(input.resume),
            nbr_pages: Set(input.nbr_pages),
            price: Set(input.price),
            visibility: Set(input.visibility),
            follow_number: Set(0),
            edition_id: Set(input.edition_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(created)
    }

    async fn update(&self, volume: volume::Model) -> Result<volume::Model, DomainError> {
        ensure_edition(&self.db, volume.edition_id).await?;

        // follow_number is left out: only library commits write it
        let updated = ActiveModel {
            id: Unchanged(volume.id),
            title: Set(volume.title),
            slug: Set(volume.slug),
            number: Set(volume.number),
            release_date: Set(volume.release_date),
            create_date: Set(volume.create_date),
            image: Set(volume.image),
            resume: Set(volume.resume),
            nbr_pages: Set(volume.nbr_pages),
            price: Set(volume.price),
            visibility: Set(volume.visibility),
            edition_id: Set(volume.edition_id),
            ..Default::default()
        }
        .update(&self.db)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = VolumeEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound("Volume"));
        }

        Ok(())
    }
}
