//! Library Service - ownership records and the counters derived from them
//!
//! `volumes.follow_number`, `users.count_volume` and `users.count_volume_read`
//! are only ever moved from here, through `LibraryRepository::commit`, so that
//! each counter keeps matching the library rows it summarizes.

use crate::domain::{CounterDelta, DomainError, LibraryChange};
use crate::infrastructure::AppState;
use crate::models::library;

fn read_delta(is_read: bool) -> i32 {
    if is_read { 1 } else { 0 }
}

fn ensure_owner(entry: &library::Model, acting_user_id: i32) -> Result<(), DomainError> {
    if entry.user_id != acting_user_id {
        tracing::warn!(
            "User {} tried to modify library entry {} owned by user {}",
            acting_user_id,
            entry.id,
            entry.user_id
        );
        return Err(DomainError::Unauthorized);
    }
    Ok(())
}

async fn find_entry(state: &AppState, entry_id: i32) -> Result<library::Model, DomainError> {
    state
        .library_repo
        .find_by_id(entry_id)
        .await?
        .ok_or(DomainError::NotFound("Library"))
}

/// Adds `volume_id` to the library of `user_id`.
pub async fn create_entry(
    state: &AppState,
    volume_id: i32,
    user_id: i32,
    is_read: bool,
) -> Result<library::Model, DomainError> {
    if state.volume_repo.find_by_id(volume_id).await?.is_none() {
        return Err(DomainError::NotFound("Volume"));
    }
    if state.user_repo.find_by_id(user_id).await?.is_none() {
        return Err(DomainError::NotFound("User"));
    }

    let delta = CounterDelta {
        follow_number: 1,
        count_volume: 1,
        count_volume_read: read_delta(is_read),
    };
    let change = LibraryChange::Insert {
        volume_id,
        user_id,
        is_read,
    };

    let entry = state
        .library_repo
        .commit(change, delta)
        .await?
        .ok_or_else(|| DomainError::Persistence("library insert returned no row".to_string()))?;

    tracing::info!(
        "Library entry {} created: volume {} for user {}",
        entry.id,
        volume_id,
        user_id
    );
    Ok(entry)
}

/// Flips the read flag of an entry owned by `acting_user_id`.
pub async fn toggle_read(
    state: &AppState,
    entry_id: i32,
    acting_user_id: i32,
) -> Result<library::Model, DomainError> {
    let entry = find_entry(state, entry_id).await?;
    ensure_owner(&entry, acting_user_id)?;

    let is_read = !entry.is_read;
    let delta = CounterDelta {
        count_volume_read: if is_read { 1 } else { -1 },
        ..Default::default()
    };

    let entry = state
        .library_repo
        .commit(LibraryChange::SetRead { entry, is_read }, delta)
        .await?
        .ok_or_else(|| DomainError::Persistence("library update returned no row".to_string()))?;

    tracing::info!("Library entry {} marked is_read={}", entry.id, entry.is_read);
    Ok(entry)
}

/// Removes an entry owned by `acting_user_id`.
pub async fn delete_entry(
    state: &AppState,
    entry_id: i32,
    acting_user_id: i32,
) -> Result<(), DomainError> {
    let entry = find_entry(state, entry_id).await?;
    ensure_owner(&entry, acting_user_id)?;

    release(state, entry).await?;
    tracing::info!("Library entry {} deleted by user {}", entry_id, acting_user_id);
    Ok(())
}

/// Removes an entry and rolls back every counter it contributed to.
async fn release(state: &AppState, entry: library::Model) -> Result<(), DomainError> {
    let delta = CounterDelta {
        follow_number: -1,
        count_volume: -1,
        count_volume_read: -read_delta(entry.is_read),
    };
    state
        .library_repo
        .commit(LibraryChange::Remove { entry }, delta)
        .await?;
    Ok(())
}

/// Deletes a user after releasing their library entries.
pub async fn delete_user(state: &AppState, user_id: i32) -> Result<(), DomainError> {
    if state.user_repo.find_by_id(user_id).await?.is_none() {
        return Err(DomainError::NotFound("User"));
    }

    let entries = state.library_repo.find_by_user(user_id).await?;
    let released = entries.len();
    for entry in entries {
        release(state, entry).await?;
    }

    state.user_repo.delete(user_id).await?;
    tracing::info!("User {} deleted ({} library entries released)", user_id, released);
    Ok(())
}

/// Deletes a volume after releasing every library entry that references it.
pub async fn delete_volume(state: &AppState, volume_id: i32) -> Result<(), DomainError> {
    if state.volume_repo.find_by_id(volume_id).await?.is_none() {
        return Err(DomainError::NotFound("Volume"));
    }

    let entries = state.library_repo.find_by_volume(volume_id).await?;
    let released = entries.len();
    for entry in entries {
        release(state, entry).await?;
    }

    state.volume_repo.delete(volume_id).await?;
    tracing::info!("Volume {} deleted ({} library entries released)", volume_id, released);
    Ok(())
}

/// Adds a volume to the user's wish list. Adding twice is a no-op.
pub async fn add_to_wish_list(
    state: &AppState,
    user_id: i32,
    volume_id: i32,
) -> Result<(), DomainError> {
    if state.volume_repo.find_by_id(volume_id).await?.is_none() {
        return Err(DomainError::NotFound("Volume"));
    }
    if state.user_repo.find_by_id(user_id).await?.is_none() {
        return Err(DomainError::NotFound("User"));
    }

    state.user_repo.add_to_wish_list(user_id, volume_id).await?;
    tracing::debug!("Volume {} wished by user {}", volume_id, user_id);
    Ok(())
}

pub async fn remove_from_wish_list(
    state: &AppState,
    user_id: i32,
    volume_id: i32,
) -> Result<(), DomainError> {
    state.user_repo.remove_from_wish_list(user_id, volume_id).await?;
    tracing::debug!("Volume {} unwished by user {}", volume_id, user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user_id: i32) -> library::Model {
        library::Model {
            id: 5,
            is_read: false,
            volume_id: 9,
            user_id,
        }
    }

    #[test]
    fn test_owner_may_modify() {
        assert!(ensure_owner(&entry(3), 3).is_ok());
    }

    #[test]
    fn test_other_user_is_unauthorized() {
        assert!(matches!(
            ensure_owner(&entry(3), 4),
            Err(DomainError::Unauthorized)
        ));
    }
}
