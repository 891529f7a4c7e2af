use mangatheque::domain::{CounterDelta, DomainError, LibraryChange, NewUser};
use mangatheque::infrastructure::AppState;
use mangatheque::models::Role;
use mangatheque::services::{catalog_service, library_service};
use mangatheque::{db, seed};

async fn setup_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    seed::seed_demo_data(&db)
        .await
        .expect("Failed to seed catalog");
    AppState::new(db)
}

/// File-backed database, so that concurrent transactions use separate connections.
async fn setup_file_state(name: &str) -> (AppState, std::path::PathBuf) {
    let path = std::env::temp_dir().join(format!("mangatheque-{}-{}.db", name, std::process::id()));
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = db::init_db(&url).await.expect("Failed to init DB");
    seed::seed_demo_data(&db)
        .await
        .expect("Failed to seed catalog");
    (AppState::new(db), path)
}

fn remove_db_files(path: &std::path::Path) {
    for suffix in ["", "-wal", "-shm", "-journal"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

async fn create_reader(state: &AppState, email: &str) -> i32 {
    state
        .user_repo
        .create(NewUser {
            name: None,
            surname: None,
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            picture: None,
            date_of_birth: None,
            gender: None,
            role: Role::User,
        })
        .await
        .expect("Failed to create user")
        .id
}

async fn follow_number(state: &AppState, volume_id: i32) -> i32 {
    state
        .volume_repo
        .find_by_id(volume_id)
        .await
        .unwrap()
        .expect("volume exists")
        .follow_number
}

/// (count_volume, count_volume_read)
async fn user_counters(state: &AppState, user_id: i32) -> (i32, i32) {
    let user = state
        .user_repo
        .find_by_id(user_id)
        .await
        .unwrap()
        .expect("user exists");
    (user.count_volume, user.count_volume_read)
}

#[tokio::test]
async fn test_create_entry_increments_counters() {
    let state = setup_state().await;
    let reader = create_reader(&state, "reader@example.com").await;

    library_service::create_entry(&state, 1, reader, false)
        .await
        .unwrap();
    library_service::create_entry(&state, 2, reader, true)
        .await
        .unwrap();

    assert_eq!(follow_number(&state, 1).await, 1);
    assert_eq!(follow_number(&state, 2).await, 1);
    assert_eq!(user_counters(&state, reader).await, (2, 1));
}

#[tokio::test]
async fn test_create_entry_for_unknown_volume_changes_nothing() {
    let state = setup_state().await;
    let reader = create_reader(&state, "reader@example.com").await;

    let result = library_service::create_entry(&state, 999, reader, true).await;

    assert!(matches!(result, Err(DomainError::NotFound("Volume"))));
    assert_eq!(user_counters(&state, reader).await, (0, 0));
}

#[tokio::test]
async fn test_toggle_read_twice_restores_counters() {
    let state = setup_state().await;
    let reader = create_reader(&state, "reader@example.com").await;
    let entry = library_service::create_entry(&state, 1, reader, false)
        .await
        .unwrap();

    let toggled = library_service::toggle_read(&state, entry.id, reader)
        .await
        .unwrap();
    assert!(toggled.is_read);
    assert_eq!(user_counters(&state, reader).await, (1, 1));

    let toggled = library_service::toggle_read(&state, entry.id, reader)
        .await
        .unwrap();
    assert!(!toggled.is_read);
    assert_eq!(user_counters(&state, reader).await, (1, 0));
    assert_eq!(follow_number(&state, 1).await, 1);
}

#[tokio::test]
async fn test_foreign_entry_is_rejected_without_side_effects() {
    let state = setup_state().await;
    let owner = create_reader(&state, "owner@example.com").await;
    let intruder = create_reader(&state, "intruder@example.com").await;
    let entry = library_service::create_entry(&state, 1, owner, false)
        .await
        .unwrap();

    let toggle = library_service::toggle_read(&state, entry.id, intruder).await;
    assert!(matches!(toggle, Err(DomainError::Unauthorized)));

    let delete = library_service::delete_entry(&state, entry.id, intruder).await;
    assert!(matches!(delete, Err(DomainError::Unauthorized)));

    assert_eq!(user_counters(&state, owner).await, (1, 0));
    assert_eq!(user_counters(&state, intruder).await, (0, 0));
    assert_eq!(follow_number(&state, 1).await, 1);
}

#[tokio::test]
async fn test_delete_entry_rolls_back_counters() {
    let state = setup_state().await;
    let reader = create_reader(&state, "reader@example.com").await;
    let unread = library_service::create_entry(&state, 1, reader, false)
        .await
        .unwrap();
    let read = library_service::create_entry(&state, 2, reader, true)
        .await
        .unwrap();

    library_service::delete_entry(&state, unread.id, reader)
        .await
        .unwrap();
    assert_eq!(user_counters(&state, reader).await, (1, 1));
    assert_eq!(follow_number(&state, 1).await, 0);

    library_service::delete_entry(&state, read.id, reader)
        .await
        .unwrap();
    assert_eq!(user_counters(&state, reader).await, (0, 0));
    assert_eq!(follow_number(&state, 2).await, 0);

    let again = library_service::delete_entry(&state, read.id, reader).await;
    assert!(matches!(again, Err(DomainError::NotFound("Library"))));
}

#[tokio::test]
async fn test_deleting_user_releases_follows() {
    let state = setup_state().await;
    let leaving = create_reader(&state, "leaving@example.com").await;
    let staying = create_reader(&state, "staying@example.com").await;
    library_service::create_entry(&state, 1, leaving, true)
        .await
        .unwrap();
    library_service::create_entry(&state, 2, leaving, false)
        .await
        .unwrap();
    library_service::create_entry(&state, 1, staying, false)
        .await
        .unwrap();
    library_service::add_to_wish_list(&state, leaving, 3)
        .await
        .unwrap();

    library_service::delete_user(&state, leaving).await.unwrap();

    assert!(state.user_repo.find_by_id(leaving).await.unwrap().is_none());
    assert_eq!(follow_number(&state, 1).await, 1);
    assert_eq!(follow_number(&state, 2).await, 0);
    assert_eq!(user_counters(&state, staying).await, (1, 0));
}

#[tokio::test]
async fn test_deleting_volume_releases_owner_counters() {
    let state = setup_state().await;
    let first = create_reader(&state, "first@example.com").await;
    let second = create_reader(&state, "second@example.com").await;
    library_service::create_entry(&state, 4, first, true)
        .await
        .unwrap();
    library_service::create_entry(&state, 5, first, false)
        .await
        .unwrap();
    library_service::create_entry(&state, 4, second, false)
        .await
        .unwrap();

    catalog_service::delete_volume(&state, 4).await.unwrap();

    assert!(state.volume_repo.find_by_id(4).await.unwrap().is_none());
    assert_eq!(user_counters(&state, first).await, (1, 0));
    assert_eq!(user_counters(&state, second).await, (0, 0));
    assert_eq!(follow_number(&state, 5).await, 1);
}

#[tokio::test]
async fn test_wish_list_operations_are_idempotent() {
    let state = setup_state().await;
    let reader = create_reader(&state, "reader@example.com").await;

    library_service::add_to_wish_list(&state, reader, 7)
        .await
        .unwrap();
    library_service::add_to_wish_list(&state, reader, 7)
        .await
        .unwrap();
    assert_eq!(state.user_repo.wish_list(reader).await.unwrap().len(), 1);

    library_service::remove_from_wish_list(&state, reader, 7)
        .await
        .unwrap();
    library_service::remove_from_wish_list(&state, reader, 7)
        .await
        .unwrap();
    assert!(state.user_repo.wish_list(reader).await.unwrap().is_empty());

    let unknown = library_service::add_to_wish_list(&state, reader, 999).await;
    assert!(matches!(unknown, Err(DomainError::NotFound("Volume"))));
}

#[tokio::test]
async fn test_volume_detail_reports_viewer_state() {
    let state = setup_state().await;
    let reader = create_reader(&state, "reader@example.com").await;
    let entry = library_service::create_entry(&state, 2, reader, true)
        .await
        .unwrap();
    library_service::add_to_wish_list(&state, reader, 2)
        .await
        .unwrap();

    let anonymous = catalog_service::volume_detail(&state, "one-piece", "original", 2, None)
        .await
        .unwrap();
    assert_eq!(anonymous.view.volume.id, 2);
    assert_eq!(anonymous.volumes_count, 3);
    assert_eq!(anonymous.volume_in_library.0, None);
    assert!(!anonymous.volume_in_wish_list);
    assert!(!anonymous.volume_is_read);

    let connected =
        catalog_service::volume_detail(&state, "one-piece", "original", 2, Some(reader))
            .await
            .unwrap();
    assert_eq!(connected.volume_in_library.0, Some(entry.id));
    assert!(connected.volume_in_wish_list);
    assert!(connected.volume_is_read);

    let json = serde_json::to_value(&anonymous).unwrap();
    assert_eq!(json["volumeInLibrary"], serde_json::json!(false));
    assert_eq!(json["followNumber"], serde_json::json!(1));

    let missing = catalog_service::volume_detail(&state, "one-piece", "original", 9, None).await;
    assert!(matches!(missing, Err(DomainError::NotFound("Volume"))));
}

#[tokio::test]
async fn test_profile_lists_library_and_wish_list() {
    let state = setup_state().await;
    let reader = create_reader(&state, "reader@example.com").await;
    library_service::create_entry(&state, 1, reader, false)
        .await
        .unwrap();
    library_service::add_to_wish_list(&state, reader, 8)
        .await
        .unwrap();

    let profile = state
        .user_repo
        .find_profile(reader)
        .await
        .unwrap()
        .expect("profile exists");

    assert_eq!(profile.user.count_volume, 1);
    assert_eq!(profile.libraries.len(), 1);
    assert_eq!(profile.libraries[0].volume.volume.id, 1);
    assert_eq!(profile.wish_list.len(), 1);
    let collection = profile.wish_list[0]
        .edition
        .as_ref()
        .and_then(|e| e.collection.as_ref())
        .expect("collection loaded");
    assert_eq!(collection.collection.title, "Vinland Saga");
}

#[tokio::test]
async fn test_stale_read_flag_does_not_shift_counters() {
    let state = setup_state().await;
    let reader = create_reader(&state, "reader@example.com").await;
    let snapshot = library_service::create_entry(&state, 1, reader, false)
        .await
        .unwrap();
    let mark_read = CounterDelta {
        count_volume_read: 1,
        ..Default::default()
    };

    let first = state
        .library_repo
        .commit(
            LibraryChange::SetRead {
                entry: snapshot.clone(),
                is_read: true,
            },
            mark_read,
        )
        .await
        .unwrap();
    assert!(first.expect("entry kept").is_read);

    let replay = state
        .library_repo
        .commit(
            LibraryChange::SetRead {
                entry: snapshot.clone(),
                is_read: true,
            },
            mark_read,
        )
        .await;
    assert!(matches!(replay, Err(DomainError::Conflict(_))));
    assert_eq!(user_counters(&state, reader).await, (1, 1));

    // Removing with the unread snapshot would leave the read count behind
    let stale_remove = state
        .library_repo
        .commit(
            LibraryChange::Remove {
                entry: snapshot.clone(),
            },
            CounterDelta {
                follow_number: -1,
                count_volume: -1,
                count_volume_read: 0,
            },
        )
        .await;
    assert!(matches!(stale_remove, Err(DomainError::Conflict(_))));
    assert_eq!(user_counters(&state, reader).await, (1, 1));
    assert_eq!(follow_number(&state, 1).await, 1);

    library_service::delete_entry(&state, snapshot.id, reader)
        .await
        .unwrap();
    assert_eq!(user_counters(&state, reader).await, (0, 0));
    assert_eq!(follow_number(&state, 1).await, 0);

    let gone = state
        .library_repo
        .commit(LibraryChange::Remove { entry: snapshot }, CounterDelta::default())
        .await;
    assert!(matches!(gone, Err(DomainError::NotFound("Library"))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_toggles_keep_read_count_in_step() {
    let (state, path) = setup_file_state("toggles").await;
    let reader = create_reader(&state, "reader@example.com").await;
    let entry = library_service::create_entry(&state, 1, reader, false)
        .await
        .unwrap();

    for _ in 0..10 {
        let (a, b) = tokio::join!(
            library_service::toggle_read(&state, entry.id, reader),
            library_service::toggle_read(&state, entry.id, reader),
        );
        // A losing toggle may fail, but never leaves the counters behind
        for result in [a, b] {
            if let Err(e) = result {
                assert!(
                    matches!(e, DomainError::Conflict(_) | DomainError::Persistence(_)),
                    "unexpected error: {:?}",
                    e
                );
            }
        }

        let stored = state
            .library_repo
            .find_by_id(entry.id)
            .await
            .unwrap()
            .expect("entry exists");
        assert_eq!(
            user_counters(&state, reader).await,
            (1, stored.is_read as i32)
        );
    }
    assert_eq!(follow_number(&state, 1).await, 1);

    drop(state);
    remove_db_files(&path);
}
