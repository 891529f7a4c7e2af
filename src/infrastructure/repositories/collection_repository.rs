//! SeaORM implementation of CollectionRepository

use std::collections::HashSet;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    TransactionTrait, Unchanged,
};

use crate::domain::{
    CollectionDetail, CollectionFilter, CollectionOrder, CollectionRepository, DomainError,
    EditionWithVolumes, NewCollection, PageWindow,
};
use crate::models::collection::{ActiveModel, Column, Entity as CollectionEntity, Relation};
use crate::models::{author, category, collection, collection_tags, edition, editor, tag, volume};

/// Volumes embedded per edition in a collection detail
pub const DETAIL_VOLUMES_CAP: u64 = 7;

/// SeaORM-based implementation of CollectionRepository
pub struct SeaOrmCollectionRepository {
    db: DatabaseConnection,
}

impl SeaOrmCollectionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Case-sensitive prefix match on the collection title.
///
/// SQLite's LIKE ignores ASCII case, so `instr` is used instead.
pub(crate) fn title_starts_with(prefix: &str) -> SimpleExpr {
    Expr::cust_with_values(
        r#"instr("collections"."title", ?) = 1"#,
        [prefix.to_string()],
    )
}

/// Base query shared by the count and the page fetch of a listing
fn filtered(filter: &CollectionFilter) -> Select<CollectionEntity> {
    let mut query = CollectionEntity::find();

    if filter.category_slug.is_some() || filter.category_names.is_some() {
        query = query.join(JoinType::InnerJoin, Relation::Category.def());
    }

    if let Some(prefix) = &filter.title_prefix {
        query = query.filter(title_starts_with(prefix));
    }

    if let Some(slug) = &filter.category_slug {
        query = query.filter(category::Column::Slug.eq(slug.as_str()));
    }

    if let Some(names) = &filter.category_names {
        query = query.filter(category::Column::Name.is_in(names.iter().cloned()));
    }

    match filter.order {
        CollectionOrder::Id => query.order_by_asc(Column::Id),
        CollectionOrder::NewestRelease => query
            .order_by_desc(Column::ReleaseDate)
            .order_by_asc(Column::Id),
    }
}

async fn ensure_title_free<C: ConnectionTrait>(
    db: &C,
    title: &str,
    except_id: Option<i32>,
) -> Result<(), DomainError> {
    let mut query = CollectionEntity::find().filter(Column::Title.eq(title));
    if let Some(id) = except_id {
        query = query.filter(Column::Id.ne(id));
    }

    if query.count(db).await? > 0 {
        return Err(DomainError::Conflict(format!(
            "a collection titled '{}' already exists",
            title
        )));
    }
    Ok(())
}

/// Links the tags not yet attached to the collection
async fn attach_tags<C: ConnectionTrait>(
    db: &C,
    collection_id: i32,
    tag_ids: Vec<i32>,
) -> Result<(), DomainError> {
    let wanted: HashSet<i32> = tag_ids.into_iter().collect();
    if wanted.is_empty() {
        return Ok(());
    }

    let known = tag::Entity::find()
        .filter(tag::Column::Id.is_in(wanted.iter().copied()))
        .count(db)
        .await?;
    if known as usize != wanted.len() {
        return Err(DomainError::NotFound("Tag"));
    }

    let attached: HashSet<i32> = collection_tags::Entity::find()
        .filter(collection_tags::Column::CollectionId.eq(collection_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.tag_id)
        .collect();

    for tag_id in wanted.difference(&attached) {
        collection_tags::ActiveModel {
            collection_id: Set(collection_id),
            tag_id: Set(*tag_id),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl CollectionRepository for SeaOrmCollectionRepository {
    async fn find_all(&self) -> Result<Vec<collection::Model>, DomainError> {
        Ok(CollectionEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<collection::Model>, DomainError> {
        Ok(CollectionEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_detail_by_slug(&self, slug: &str) -> Result<Option<CollectionDetail>, DomainError> {
        let Some(found) = CollectionEntity::find()
            .filter(Column::Slug.eq(slug))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let author = match found.author_id {
            Some(id) => author::Entity::find_by_id(id).one(&self.db).await?,
            None => None,
        };
        let editor = match found.editor_id {
            Some(id) => editor::Entity::find_by_id(id).one(&self.db).await?,
            None => None,
        };
        let category = match found.category_id {
            Some(id) => category::Entity::find_by_id(id).one(&self.db).await?,
            None => None,
        };

        let tags = found
            .find_related(tag::Entity)
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await?;

        let mut editions = Vec::new();
        for ed in found
            .find_related(edition::Entity)
            .order_by_asc(edition::Column::Id)
            .all(&self.db)
            .await?
        {
            let in_edition = volume::Entity::find().filter(volume::Column::EditionId.eq(ed.id));
            let volumes_count = in_edition.clone().count(&self.db).await?;
            let volumes = in_edition
                .order_by_asc(volume::Column::Number)
                .limit(DETAIL_VOLUMES_CAP)
                .all(&self.db)
                .await?;

            editions.push(EditionWithVolumes {
                edition: ed,
                volumes,
                volumes_count,
            });
        }

        Ok(Some(CollectionDetail {
            collection: found,
            author,
            editor,
            category,
            editions,
            tags,
        }))
    }

    async fn count(&self, filter: &CollectionFilter) -> Result<u64, DomainError> {
        Ok(filtered(filter).count(&self.db).await?)
    }

    async fn find_window(
        &self,
        filter: &CollectionFilter,
        window: &PageWindow,
    ) -> Result<Vec<collection::Model>, DomainError> {
        if window.is_empty() {
            return Ok(Vec::new());
        }

        Ok(filtered(filter)
            .offset(window.offset)
            .limit(window.limit)
            .all(&self.db)
            .await?)
    }

    async fn category_names_for_title(&self, title_prefix: &str) -> Result<Vec<String>, DomainError> {
        let names = category::Entity::find()
            .select_only()
            .column(category::Column::Name)
            .distinct()
            .join(JoinType::InnerJoin, category::Relation::Collection.def())
            .filter(title_starts_with(title_prefix))
            .order_by_asc(category::Column::Name)
            .into_tuple::<String>()
            .all(&self.db)
            .await?;

        Ok(names)
    }

    async fn create(&self, input: NewCollection) -> Result<collection::Model, DomainError> {
        let txn = self.db.begin().await?;
        ensure_title_free(&txn, &input.title, None).await?;

        let created = ActiveModel {
            title: Set(input.title),
            image: Set(input.image),
            release_date: Set(input.release_date),
            create_date: Set(chrono::Utc::now().format("%Y-%m-%d").to_string()),
            is_finish: Set(input.is_finish),
            visibility: Set(input.visibility),
            resume: Set(input.resume),
            follow_number: Set(0),
            author_id: Set(input.author_id),
            category_id: Set(input.category_id),
            editor_id: Set(input.editor_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        attach_tags(&txn, created.id, input.tags_id).await?;
        txn.commit().await?;

        Ok(created)
    }

    async fn update(
        &self,
        collection: collection::Model,
        extra_tags: Vec<i32>,
    ) -> Result<collection::Model, DomainError> {
        let txn = self.db.begin().await?;
        ensure_title_free(&txn, &collection.title, Some(collection.id)).await?;

        let updated = ActiveModel {
            id: Unchanged(collection.id),
            title: Set(collection.title),
            slug: Set(collection.slug),
            image: Set(collection.image),
            release_date: Set(collection.release_date),
            create_date: Set(collection.create_date),
            is_finish: Set(collection.is_finish),
            visibility: Set(collection.visibility),
            resume: Set(collection.resume),
            follow_number: Set(collection.follow_number),
            author_id: Set(collection.author_id),
            category_id: Set(collection.category_id),
            editor_id: Set(collection.editor_id),
        }
        .update(&txn)
        .await?;

        attach_tags(&txn, updated.id, extra_tags).await?;
        txn.commit().await?;

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let editions = edition::Entity::find()
            .filter(edition::Column::CollectionId.eq(id))
            .count(&self.db)
            .await?;
        if editions > 0 {
            return Err(DomainError::Conflict(format!(
                "collection {} still has {} edition(s)",
                id, editions
            )));
        }

        let result = CollectionEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound("Collection"));
        }

        Ok(())
    }
}
