use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

use crate::domain::slug::slugify;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "volumes")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub slug: String,
    /// Tome index inside its edition.
    pub number: i32,
    pub release_date: Option<String>, // YYYY-MM-DD
    pub create_date: String,
    pub image: Option<String>,
    pub resume: Option<String>,
    pub nbr_pages: Option<i32>,
    #[sea_orm(column_type = "Double", nullable)]
    pub price: Option<f64>,
    pub visibility: bool,
    /// Number of library entries referencing this volume.
    /// Only the library lifecycle writes it.
    pub follow_number: i32,
    pub edition_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::edition::Entity",
        from = "Column::EditionId",
        to = "super::edition::Column::Id"
    )]
    Edition,
    #[sea_orm(has_many = "super::library::Entity")]
    Library,
    #[sea_orm(has_many = "super::wish_list::Entity")]
    WishList,
}

impl Related<super::edition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Edition.def()
    }
}

impl Related<super::library::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Library.def()
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
