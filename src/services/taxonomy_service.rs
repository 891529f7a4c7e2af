//! Taxonomy Service - authors, categories, editors, tags and editions
//!
//! These entities carry no derived state, so they are read and written
//! directly through SeaORM.

use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::domain::slug::{author_slug, resolve_slug};
use crate::domain::DomainError;
use crate::models::{author, category, collection, collection_tags, edition, editor, tag, volume};
use crate::services::catalog_service::{validate_date, validate_name};

/// Entity annotated with the number of collections referencing it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithCollectionCount<T> {
    #[serde(flatten)]
    pub entity: T,
    pub count_collections: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: tag::Model,
    pub collections_count: i64,
}

/// Entity with the collections referencing it
#[derive(Debug, Clone, Serialize)]
pub struct WithCollections<T> {
    #[serde(flatten)]
    pub entity: T,
    pub collections: Vec<collection::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditionWithCollection {
    #[serde(flatten)]
    pub edition: edition::Model,
    pub collection: Option<collection::Model>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuthor {
    pub name: String,
    pub surname: String,
    pub gender: Option<String>,
    pub image: Option<String>,
    pub biography: Option<String>,
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub gender: Option<String>,
    pub image: Option<String>,
    pub biography: Option<String>,
    pub date_of_birth: Option<String>,
}

impl AuthorPatch {
    /// A change to either part of the name recomputes the slug from the resulting pair.
    pub fn apply(self, current: author::Model) -> author::Model {
        let renamed = self.name.as_ref().is_some_and(|n| *n != current.name)
            || self.surname.as_ref().is_some_and(|s| *s != current.surname);
        let name = self.name.unwrap_or(current.name);
        let surname = self.surname.unwrap_or(current.surname);
        let slug = if renamed {
            author_slug(&name, &surname)
        } else {
            current.slug
        };

        author::Model {
            id: current.id,
            name,
            surname,
            gender: self.gender.or(current.gender),
            image: self.image.or(current.image),
            slug,
            biography: self.biography.or(current.biography),
            date_of_birth: self.date_of_birth.or(current.date_of_birth),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEditor {
    pub name: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub official_website: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorPatch {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub official_website: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagInput {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEdition {
    pub name: String,
    pub collection_id: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditionPatch {
    pub name: Option<String>,
    pub collection_id: Option<i32>,
}

/// Collections per value of a collection foreign key column
async fn collection_counts_by(
    db: &DatabaseConnection,
    column: collection::Column,
) -> Result<HashMap<i32, i64>, DomainError> {
    let rows: Vec<(Option<i32>, i64)> = collection::Entity::find()
        .select_only()
        .column(column)
        .column_as(Expr::col(collection::Column::Id).count(), "count_collections")
        .group_by(column)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, count)| id.map(|id| (id, count)))
        .collect())
}

/// Blank replacement names are rejected; an absent one keeps the stored value.
fn validate_renamed(field: &str, value: Option<&str>) -> Result<(), DomainError> {
    value.map_or(Ok(()), |v| validate_name(field, v))
}

fn not_deleted(result: DeleteResult, entity: &'static str) -> Result<(), DomainError> {
    if result.rows_affected == 0 {
        return Err(DomainError::NotFound(entity));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

pub async fn list_authors(db: &DatabaseConnection) -> Result<Vec<author::Model>, DomainError> {
    Ok(author::Entity::find()
        .order_by_asc(author::Column::Id)
        .all(db)
        .await?)
}

pub async fn authors_with_count(
    db: &DatabaseConnection,
) -> Result<Vec<WithCollectionCount<author::Model>>, DomainError> {
    let counts = collection_counts_by(db, collection::Column::AuthorId).await?;
    Ok(list_authors(db)
        .await?
        .into_iter()
        .map(|a| WithCollectionCount {
            count_collections: counts.get(&a.id).copied().unwrap_or(0),
            entity: a,
        })
        .collect())
}

pub async fn get_author(db: &DatabaseConnection, id: i32) -> Result<author::Model, DomainError> {
    author::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Author"))
}

pub async fn author_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<WithCollections<author::Model>, DomainError> {
    let found = author::Entity::find()
        .filter(author::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Author"))?;
    let collections = found.find_related(collection::Entity).all(db).await?;

    Ok(WithCollections {
        entity: found,
        collections,
    })
}

pub async fn create_author(
    db: &DatabaseConnection,
    input: NewAuthor,
) -> Result<author::Model, DomainError> {
    validate_name("name", &input.name)?;
    validate_name("surname", &input.surname)?;
    validate_date("dateOfBirth", input.date_of_birth.as_deref())?;

    let created = author::ActiveModel {
        name: Set(input.name),
        surname: Set(input.surname),
        gender: Set(input.gender),
        image: Set(input.image),
        biography: Set(input.biography),
        date_of_birth: Set(input.date_of_birth),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Author {} created as '{}'", created.id, created.slug);
    Ok(created)
}

pub async fn update_author(
    db: &DatabaseConnection,
    id: i32,
    patch: AuthorPatch,
) -> Result<author::Model, DomainError> {
    validate_renamed("name", patch.name.as_deref())?;
    validate_renamed("surname", patch.surname.as_deref())?;
    validate_date("dateOfBirth", patch.date_of_birth.as_deref())?;
    let next = patch.apply(get_author(db, id).await?);

    let updated = author::ActiveModel {
        id: Unchanged(next.id),
        name: Set(next.name),
        surname: Set(next.surname),
        gender: Set(next.gender),
        image: Set(next.image),
        slug: Set(next.slug),
        biography: Set(next.biography),
        date_of_birth: Set(next.date_of_birth),
    }
    .update(db)
    .await?;

    Ok(updated)
}

pub async fn delete_author(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    not_deleted(author::Entity::delete_by_id(id).exec(db).await?, "Author")
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>, DomainError> {
    Ok(category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?)
}

pub async fn categories_with_count(
    db: &DatabaseConnection,
) -> Result<Vec<WithCollectionCount<category::Model>>, DomainError> {
    let counts = collection_counts_by(db, collection::Column::CategoryId).await?;
    Ok(list_categories(db)
        .await?
        .into_iter()
        .map(|c| WithCollectionCount {
            count_collections: counts.get(&c.id).copied().unwrap_or(0),
            entity: c,
        })
        .collect())
}

pub async fn get_category(db: &DatabaseConnection, id: i32) -> Result<category::Model, DomainError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Category"))
}

pub async fn category_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<WithCollections<category::Model>, DomainError> {
    let found = category::Entity::find()
        .filter(category::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Category"))?;
    let collections = found.find_related(collection::Entity).all(db).await?;

    Ok(WithCollections {
        entity: found,
        collections,
    })
}

pub async fn category_collections(
    db: &DatabaseConnection,
    id: i32,
) -> Result<WithCollections<category::Model>, DomainError> {
    let found = get_category(db, id).await?;
    let collections = found.find_related(collection::Entity).all(db).await?;

    Ok(WithCollections {
        entity: found,
        collections,
    })
}

pub async fn create_category(
    db: &DatabaseConnection,
    input: NewCategory,
) -> Result<category::Model, DomainError> {
    validate_name("name", &input.name)?;

    let created = category::ActiveModel {
        name: Set(input.name),
        description: Set(input.description),
        image: Set(input.image),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Category {} created as '{}'", created.id, created.slug);
    Ok(created)
}

pub async fn update_category(
    db: &DatabaseConnection,
    id: i32,
    patch: CategoryPatch,
) -> Result<category::Model, DomainError> {
    validate_renamed("name", patch.name.as_deref())?;
    let current = get_category(db, id).await?;
    let slug = resolve_slug(&current.name, &current.slug, patch.name.as_deref());

    let updated = category::ActiveModel {
        id: Unchanged(current.id),
        name: Set(patch.name.unwrap_or(current.name)),
        slug: Set(slug),
        description: Set(patch.description.or(current.description)),
        image: Set(patch.image.or(current.image)),
    }
    .update(db)
    .await?;

    Ok(updated)
}

pub async fn delete_category(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    not_deleted(category::Entity::delete_by_id(id).exec(db).await?, "Category")
}

// ---------------------------------------------------------------------------
// Editors
// ---------------------------------------------------------------------------

async fn ensure_editor_name_free(
    db: &DatabaseConnection,
    name: &str,
    except_id: Option<i32>,
) -> Result<(), DomainError> {
    let mut query = editor::Entity::find().filter(editor::Column::Name.eq(name));
    if let Some(id) = except_id {
        query = query.filter(editor::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(DomainError::Conflict(format!("editor '{}' already exists", name)));
    }
    Ok(())
}

pub async fn list_editors(db: &DatabaseConnection) -> Result<Vec<editor::Model>, DomainError> {
    Ok(editor::Entity::find()
        .order_by_asc(editor::Column::Name)
        .all(db)
        .await?)
}

pub async fn editors_with_count(
    db: &DatabaseConnection,
) -> Result<Vec<WithCollectionCount<editor::Model>>, DomainError> {
    let counts = collection_counts_by(db, collection::Column::EditorId).await?;
    Ok(list_editors(db)
        .await?
        .into_iter()
        .map(|e| WithCollectionCount {
            count_collections: counts.get(&e.id).copied().unwrap_or(0),
            entity: e,
        })
        .collect())
}

pub async fn get_editor(db: &DatabaseConnection, id: i32) -> Result<editor::Model, DomainError> {
    editor::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Editor"))
}

pub async fn editor_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<WithCollections<editor::Model>, DomainError> {
    let found = editor::Entity::find()
        .filter(editor::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Editor"))?;
    let collections = found.find_related(collection::Entity).all(db).await?;

    Ok(WithCollections {
        entity: found,
        collections,
    })
}

pub async fn editor_collections(
    db: &DatabaseConnection,
    id: i32,
) -> Result<WithCollections<editor::Model>, DomainError> {
    let found = get_editor(db, id).await?;
    let collections = found.find_related(collection::Entity).all(db).await?;

    Ok(WithCollections {
        entity: found,
        collections,
    })
}

pub async fn create_editor(
    db: &DatabaseConnection,
    input: NewEditor,
) -> Result<editor::Model, DomainError> {
    validate_name("name", &input.name)?;
    ensure_editor_name_free(db, &input.name, None).await?;

    let created = editor::ActiveModel {
        name: Set(input.name),
        logo: Set(input.logo),
        description: Set(input.description),
        official_website: Set(input.official_website),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Editor {} created as '{}'", created.id, created.slug);
    Ok(created)
}

pub async fn update_editor(
    db: &DatabaseConnection,
    id: i32,
    patch: EditorPatch,
) -> Result<editor::Model, DomainError> {
    validate_renamed("name", patch.name.as_deref())?;
    let current = get_editor(db, id).await?;
    if let Some(name) = &patch.name {
        ensure_editor_name_free(db, name, Some(id)).await?;
    }
    let slug = resolve_slug(&current.name, &current.slug, patch.name.as_deref());

    let updated = editor::ActiveModel {
        id: Unchanged(current.id),
        name: Set(patch.name.unwrap_or(current.name)),
        logo: Set(patch.logo.or(current.logo)),
        description: Set(patch.description.or(current.description)),
        official_website: Set(patch.official_website.or(current.official_website)),
        slug: Set(slug),
    }
    .update(db)
    .await?;

    Ok(updated)
}

pub async fn delete_editor(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    not_deleted(editor::Entity::delete_by_id(id).exec(db).await?, "Editor")
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

async fn ensure_tag_name_free(
    db: &DatabaseConnection,
    name: &str,
    except_id: Option<i32>,
) -> Result<(), DomainError> {
    let mut query = tag::Entity::find().filter(tag::Column::Name.eq(name));
    if let Some(id) = except_id {
        query = query.filter(tag::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(DomainError::Conflict(format!("tag '{}' already exists", name)));
    }
    Ok(())
}

pub async fn list_tags(db: &DatabaseConnection) -> Result<Vec<tag::Model>, DomainError> {
    Ok(tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?)
}

pub async fn tags_with_count(db: &DatabaseConnection) -> Result<Vec<TagWithCount>, DomainError> {
    let rows: Vec<(i32, i64)> = collection_tags::Entity::find()
        .select_only()
        .column(collection_tags::Column::TagId)
        .column_as(
            Expr::col(collection_tags::Column::CollectionId).count(),
            "collections_count",
        )
        .group_by(collection_tags::Column::TagId)
        .into_tuple()
        .all(db)
        .await?;
    let counts: HashMap<i32, i64> = rows.into_iter().collect();

    Ok(list_tags(db)
        .await?
        .into_iter()
        .map(|t| TagWithCount {
            collections_count: counts.get(&t.id).copied().unwrap_or(0),
            tag: t,
        })
        .collect())
}

pub async fn get_tag(db: &DatabaseConnection, id: i32) -> Result<tag::Model, DomainError> {
    tag::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Tag"))
}

/// Every tag with the collections it is attached to
pub async fn tags_with_collections(
    db: &DatabaseConnection,
) -> Result<Vec<WithCollections<tag::Model>>, DomainError> {
    Ok(tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .find_with_related(collection::Entity)
        .all(db)
        .await?
        .into_iter()
        .map(|(entity, collections)| WithCollections {
            entity,
            collections,
        })
        .collect())
}

pub async fn tag_collections(
    db: &DatabaseConnection,
    id: i32,
) -> Result<WithCollections<tag::Model>, DomainError> {
    let found = get_tag(db, id).await?;
    let collections = found.find_related(collection::Entity).all(db).await?;

    Ok(WithCollections {
        entity: found,
        collections,
    })
}

pub async fn create_tag(db: &DatabaseConnection, input: TagInput) -> Result<tag::Model, DomainError> {
    validate_name("name", &input.name)?;
    ensure_tag_name_free(db, &input.name, None).await?;

    let created = tag::ActiveModel {
        name: Set(input.name),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(created)
}

pub async fn update_tag(
    db: &DatabaseConnection,
    id: i32,
    input: TagInput,
) -> Result<tag::Model, DomainError> {
    validate_name("name", &input.name)?;
    let current = get_tag(db, id).await?;
    ensure_tag_name_free(db, &input.name, Some(id)).await?;

    let updated = tag::ActiveModel {
        id: Unchanged(current.id),
        name: Set(input.name),
    }
    .update(db)
    .await?;

    Ok(updated)
}

pub async fn delete_tag(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    not_deleted(tag::Entity::delete_by_id(id).exec(db).await?, "Tag")
}

// ---------------------------------------------------------------------------
// Editions
// ---------------------------------------------------------------------------

async fn ensure_collection(db: &DatabaseConnection, collection_id: i32) -> Result<(), DomainError> {
    match collection::Entity::find_by_id(collection_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(DomainError::NotFound("Collection")),
    }
}

pub async fn list_editions(
    db: &DatabaseConnection,
) -> Result<Vec<EditionWithCollection>, DomainError> {
    Ok(edition::Entity::find()
        .find_also_related(collection::Entity)
        .order_by_asc(edition::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|(edition, collection)| EditionWithCollection {
            edition,
            collection,
        })
        .collect())
}

pub async fn get_edition(
    db: &DatabaseConnection,
    id: i32,
) -> Result<EditionWithCollection, DomainError> {
    let (edition, collection) = edition::Entity::find_by_id(id)
        .find_also_related(collection::Entity)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Edition"))?;

    Ok(EditionWithCollection {
        edition,
        collection,
    })
}

/// Editions of one collection, in creation order
pub async fn editions_by_collection(
    db: &DatabaseConnection,
    collection_id: i32,
) -> Result<Vec<edition::Model>, DomainError> {
    ensure_collection(db, collection_id).await?;
    Ok(edition::Entity::find()
        .filter(edition::Column::CollectionId.eq(collection_id))
        .order_by_asc(edition::Column::Id)
        .all(db)
        .await?)
}

pub async fn create_edition(
    db: &DatabaseConnection,
    input: NewEdition,
) -> Result<edition::Model, DomainError> {
    validate_name("name", &input.name)?;
    ensure_collection(db, input.collection_id).await?;

    let created = edition::ActiveModel {
        name: Set(input.name),
        collection_id: Set(input.collection_id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        "Edition {} created as '{}' in collection {}",
        created.id,
        created.slug,
        created.collection_id
    );
    Ok(created)
}

pub async fn update_edition(
    db: &DatabaseConnection,
    id: i32,
    patch: EditionPatch,
) -> Result<edition::Model, DomainError> {
    validate_renamed("name", patch.name.as_deref())?;
    let current = get_edition(db, id).await?.edition;
    if let Some(collection_id) = patch.collection_id {
        ensure_collection(db, collection_id).await?;
    }
    let slug = resolve_slug(&current.name, &current.slug, patch.name.as_deref());

    let updated = edition::ActiveModel {
        id: Unchanged(current.id),
        name: Set(patch.name.unwrap_or(current.name)),
        slug: Set(slug),
        collection_id: Set(patch.collection_id.unwrap_or(current.collection_id)),
    }
    .update(db)
    .await?;

    Ok(updated)
}

/// Fails with `Conflict` while volumes still belong to the edition.
pub async fn delete_edition(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let volumes = volume::Entity::find()
        .filter(volume::Column::EditionId.eq(id))
        .count(db)
        .await?;
    if volumes > 0 {
        return Err(DomainError::Conflict(format!(
            "edition {} still has {} volume(s)",
            id, volumes
        )));
    }

    not_deleted(edition::Entity::delete_by_id(id).exec(db).await?, "Edition")
}
