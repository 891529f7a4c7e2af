//! SeaORM implementation of UserRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, Unchanged,
};

use super::volume_repository::resolve_volume_context;
use crate::domain::{
    DomainError, LibraryEntryView, NewUser, UserProfile, UserRepository, VolumeFetch,
};
use crate::models::user::{ActiveModel, Column, Entity as UserEntity};
use crate::models::{library, user, volume, wish_list};

/// SeaORM-based implementation of UserRepository
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn ensure_email_free(&self, email: &str, except_id: Option<i32>) -> Result<(), DomainError> {
        let mut query = UserEntity::find().filter(Column::Email.eq(email));
        if let Some(id) = except_id {
            query = query.filter(Column::Id.ne(id));
        }

        if query.count(&self.db).await? > 0 {
            return Err(DomainError::Conflict(format!(
                "email '{}' is already registered",
                email
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_all(&self) -> Result<Vec<user::Model>, DomainError> {
        Ok(UserEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>, DomainError> {
        Ok(UserEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DomainError> {
        Ok(UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn create(&self, input: NewUser) -> Result<user::Model, DomainError> {
        self.ensure_email_free(&input.email, None).await?;

        let created = ActiveModel {
            name: Set(input.name),
            surname: Set(input.surname),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            picture: Set(input.picture),
            registration_date: Set(chrono::Utc::now().to_rfc3339()),
            date_of_birth: Set(input.date_of_birth),
            role: Set(input.role),
            count_volume: Set(0),
            count_volume_read: Set(0),
            gender: Set(input.gender),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(created)
    }

    async fn update(&self, user: user::Model) -> Result<user::Model, DomainError> {
        self.ensure_email_free(&user.email, Some(user.id)).await?;

        // Counters and password are not written here
        let updated = ActiveModel {
            id: Unchanged(user.id),
            name: Set(user.name),
            surname: Set(user.surname),
            email: Set(user.email),
            picture: Set(user.picture),
            date_of_birth: Set(user.date_of_birth),
            role: Set(user.role),
            gender: Set(user.gender),
            ..Default::default()
        }
        .update(&self.db)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound("User"));
        }

        Ok(())
    }

    async fn wish_list_contains(&self, user_id: i32, volume_id: i32) -> Result<bool, DomainError> {
        Ok(wish_list::Entity::find_by_id((user_id, volume_id))
            .one(&self.db)
            .await?
            .is_some())
    }

    async fn add_to_wish_list(&self, user_id: i32, volume_id: i32) -> Result<(), DomainError> {
        if self.wish_list_contains(user_id, volume_id).await? {
            return Ok(());
        }

        wish_list::ActiveModel {
            user_id: Set(user_id),
            volume_id: Set(volume_id),
        }
        .insert(&self.db)
        .await?;

        Ok(())
    }

    async fn remove_from_wish_list(&self, user_id: i32, volume_id: i32) -> Result<(), DomainError> {
        wish_list::Entity::delete_by_id((user_id, volume_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn wish_list(&self, user_id: i32) -> Result<Vec<volume::Model>, DomainError> {
        Ok(volume::Entity::find()
            .join(JoinType::InnerJoin, volume::Relation::WishList.def())
            .filter(wish_list::Column::UserId.eq(user_id))
            .order_by_asc(volume::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_profile(&self, user_id: i32) -> Result<Option<UserProfile>, DomainError> {
        let Some(user) = UserEntity::find_by_id(user_id).one(&self.db).await? else {
            return Ok(None);
        };

        let wished = self.wish_list(user_id).await?;
        let wish_list = resolve_volume_context(&self.db, wished, VolumeFetch::Collection).await?;

        let entries = library::Entity::find()
            .filter(library::Column::UserId.eq(user_id))
            .order_by_asc(library::Column::Id)
            .all(&self.db)
            .await?;

        let owned = volume::Entity::find()
            .filter(volume::Column::Id.is_in(entries.iter().map(|e| e.volume_id)))
            .all(&self.db)
            .await?;
        let owned: HashMap<i32, _> = resolve_volume_context(&self.db, owned, VolumeFetch::Collection)
            .await?
            .into_iter()
            .map(|view| (view.volume.id, view))
            .collect();

        let libraries = entries
            .into_iter()
            .filter_map(|entry| {
                let volume = owned.get(&entry.volume_id).cloned()?;
                Some(LibraryEntryView { entry, volume })
            })
            .collect();

        Ok(Some(UserProfile {
            user,
            wish_list,
            libraries,
        }))
    }
}
