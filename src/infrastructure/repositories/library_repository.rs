//! SeaORM implementation of LibraryRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::domain::{CounterDelta, DomainError, LibraryChange, LibraryRepository};
use crate::models::library::{ActiveModel, Column, Entity as LibraryEntity};
use crate::models::{library, user, volume};

/// SeaORM-based implementation of LibraryRepository
pub struct SeaOrmLibraryRepository {
    db: DatabaseConnection,
}

impl SeaOrmLibraryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// `follow_number = follow_number + delta`
async fn shift_volume(
    txn: &DatabaseTransaction,
    volume_id: i32,
    delta: &CounterDelta,
) -> Result<(), DomainError> {
    let result = volume::Entity::update_many()
        .col_expr(
            volume::Column::FollowNumber,
            Expr::col(volume::Column::FollowNumber).add(delta.follow_number),
        )
        .filter(volume::Column::Id.eq(volume_id))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(DomainError::NotFound("Volume"));
    }
    Ok(())
}

/// `count_volume(_read) = count_volume(_read) + delta`
async fn shift_user(
    txn: &DatabaseTransaction,
    user_id: i32,
    delta: &CounterDelta,
) -> Result<(), DomainError> {
    let result = user::Entity::update_many()
        .col_expr(
            user::Column::CountVolume,
            Expr::col(user::Column::CountVolume).add(delta.count_volume),
        )
        .col_expr(
            user::Column::CountVolumeRead,
            Expr::col(user::Column::CountVolumeRead).add(delta.count_volume_read),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(DomainError::NotFound("User"));
    }
    Ok(())
}

/// Error for a guarded row change that matched nothing: the entry is gone,
/// or its read flag no longer matches the caller's snapshot.
async fn stale_entry(txn: &DatabaseTransaction, id: i32) -> DomainError {
    match LibraryEntity::find_by_id(id).one(txn).await {
        Ok(Some(_)) => DomainError::Conflict(format!("Library entry {} was modified concurrently", id)),
        Ok(None) => DomainError::NotFound("Library"),
        Err(e) => e.into(),
    }
}

#[async_trait]
impl LibraryRepository for SeaOrmLibraryRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<library::Model>, DomainError> {
        Ok(LibraryEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_for(
        &self,
        volume_id: i32,
        user_id: i32,
    ) -> Result<Option<library::Model>, DomainError> {
        Ok(LibraryEntity::find()
            .filter(Column::VolumeId.eq(volume_id))
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::Id)
            .one(&self.db)
            .await?)
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Vec<library::Model>, DomainError> {
        Ok(LibraryEntity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_by_volume(&self, volume_id: i32) -> Result<Vec<library::Model>, DomainError> {
        Ok(LibraryEntity::find()
            .filter(Column::VolumeId.eq(volume_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn commit(
        &self,
        change: LibraryChange,
        delta: CounterDelta,
    ) -> Result<Option<library::Model>, DomainError> {
        // Dropping the transaction on an early return rolls everything back.
        let txn = self.db.begin().await?;

        // Existing rows change first, guarded on the read flag the delta was computed from.
        let stored = match &change {
            LibraryChange::Insert { .. } => None,
            LibraryChange::SetRead { entry, is_read } => {
                let result = LibraryEntity::update_many()
                    .col_expr(Column::IsRead, Expr::value(*is_read))
                    .filter(Column::Id.eq(entry.id))
                    .filter(Column::IsRead.eq(!*is_read))
                    .exec(&txn)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(stale_entry(&txn, entry.id).await);
                }
                Some(library::Model {
                    is_read: *is_read,
                    ..entry.clone()
                })
            }
            LibraryChange::Remove { entry } => {
                let result = LibraryEntity::delete_many()
                    .filter(Column::Id.eq(entry.id))
                    .filter(Column::IsRead.eq(entry.is_read))
                    .exec(&txn)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(stale_entry(&txn, entry.id).await);
                }
                None
            }
        };

        if delta.touches_volume() {
            shift_volume(&txn, change.volume_id(), &delta).await?;
        }
        if delta.touches_user() {
            shift_user(&txn, change.user_id(), &delta).await?;
        }

        let stored = match change {
            LibraryChange::Insert {
                volume_id,
                user_id,
                is_read,
            } => Some(
                ActiveModel {
                    is_read: Set(is_read),
                    volume_id: Set(volume_id),
                    user_id: Set(user_id),
                    ..Default::default()
                }
                .insert(&txn)
                .await?,
            ),
            _ => stored,
        };

        txn.commit().await?;
        Ok(stored)
    }
}
