use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

use crate::domain::slug::slugify;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collections")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub title: String,
    pub slug: String,
    pub image: Option<String>,
    pub release_date: Option<String>, // YYYY-MM-DD
    pub create_date: String,
    pub is_finish: bool,
    pub visibility: bool,
    pub resume: Option<String>,
    pub follow_number: i32,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    pub editor_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::author::Entity",
        from = "Column::AuthorId",
        to = "super::author::Column::Id",
        on_delete = "SetNull"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::editor::Entity",
        from = "Column::EditorId",
        to = "super::editor::Column::Id",
        on_delete = "SetNull"
    )]
    Editor,
    #[sea_orm(has_many = "super::edition::Entity")]
    Edition,
    #[sea_orm(has_many = "super::collection_tags::Entity")]
    CollectionTags,
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::editor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Editor.def()
    }
}

impl Related<super::edition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Edition.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::collection_tags::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::collection_tags::Relation::Collection.def().rev())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if let ActiveValue::Set(title) = &self.title {
                self.slug = ActiveValue::Set(slugify(title));
            }
        }
        Ok(self)
    }
}
