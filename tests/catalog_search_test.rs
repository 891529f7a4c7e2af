use mangatheque::domain::{CollectionPatch, DomainError, PageRequest};
use mangatheque::infrastructure::AppState;
use mangatheque::services::catalog_service;
use mangatheque::services::search_service::{search_collections, volumes_in_edition, SearchCriteria};
use mangatheque::{db, seed};

// One Piece, Naruto (Shonen) and Vinland Saga (Seinen), three volumes each
async fn setup_catalog() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    seed::seed_demo_data(&db)
        .await
        .expect("Failed to seed catalog");
    AppState::new(db)
}

#[tokio::test]
async fn test_title_prefix_search_reports_facets() {
    let state = setup_catalog().await;

    let page = search_collections(
        &*state.collection_repo,
        &SearchCriteria::TitlePrefix("Nar".to_string()),
        PageRequest::new(1, 10),
    )
    .await
    .unwrap();

    assert_eq!(page.count, 1);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.page, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "Naruto");
    assert_eq!(page.facets, Some(vec!["Shonen".to_string()]));
}

#[tokio::test]
async fn test_title_prefix_is_case_sensitive() {
    let state = setup_catalog().await;

    let page = search_collections(
        &*state.collection_repo,
        &SearchCriteria::TitlePrefix("nar".to_string()),
        PageRequest::new(1, 10),
    )
    .await
    .unwrap();

    assert_eq!(page.count, 0);
    assert!(page.items.is_empty());
    assert_eq!(page.facets, Some(vec![]));
}

#[tokio::test]
async fn test_category_search_counts_every_match() {
    let state = setup_catalog().await;

    let first = search_collections(
        &*state.collection_repo,
        &SearchCriteria::CategorySlug("shonen".to_string()),
        PageRequest::new(1, 1),
    )
    .await
    .unwrap();
    let second = search_collections(
        &*state.collection_repo,
        &SearchCriteria::CategorySlug("shonen".to_string()),
        PageRequest::new(2, 1),
    )
    .await
    .unwrap();

    assert_eq!(first.count, 2);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items.len(), 1);
    assert_eq!(second.items.len(), 1);
    assert_ne!(first.items[0].id, second.items[0].id);
    assert!(first.facets.is_none());
}

#[tokio::test]
async fn test_filtered_search_restricts_to_categories() {
    let state = setup_catalog().await;

    let seinen = search_collections(
        &*state.collection_repo,
        &SearchCriteria::title_in_categories("V", "Seinen"),
        PageRequest::new(1, 10),
    )
    .await
    .unwrap();
    assert_eq!(seinen.count, 1);
    assert_eq!(seinen.items[0].title, "Vinland Saga");

    let shonen = search_collections(
        &*state.collection_repo,
        &SearchCriteria::title_in_categories("V", " Shonen , "),
        PageRequest::new(1, 10),
    )
    .await
    .unwrap();
    assert_eq!(shonen.count, 0);
}

#[tokio::test]
async fn test_newest_carousel_wraps_out_of_range_pages() {
    let state = setup_catalog().await;

    let past_end = search_collections(
        &*state.collection_repo,
        &SearchCriteria::Newest,
        PageRequest::new(99, 2),
    )
    .await
    .unwrap();
    assert_eq!(past_end.page, 1);
    assert_eq!(past_end.total_pages, 2);
    assert_eq!(past_end.items.len(), 2);
    assert_eq!(past_end.items[0].title, "Vinland Saga");

    let before_start = search_collections(
        &*state.collection_repo,
        &SearchCriteria::Newest,
        PageRequest::new(0, 2),
    )
    .await
    .unwrap();
    assert_eq!(before_start.page, 2);
    assert_eq!(before_start.items.len(), 1);
    assert_eq!(before_start.items[0].title, "One Piece");
}

#[tokio::test]
async fn test_plain_search_does_not_wrap() {
    let state = setup_catalog().await;

    let page = search_collections(
        &*state.collection_repo,
        &SearchCriteria::CategorySlug("shonen".to_string()),
        PageRequest::new(5, 1),
    )
    .await
    .unwrap();

    assert_eq!(page.page, 5);
    assert_eq!(page.total_pages, 2);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_invalid_page_size_is_rejected() {
    let state = setup_catalog().await;

    let result = search_collections(
        &*state.collection_repo,
        &SearchCriteria::Newest,
        PageRequest::new(1, 0),
    )
    .await;

    assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_collection_detail_by_slug() {
    let state = setup_catalog().await;

    let detail = catalog_service::collection_detail(&state, "one-piece")
        .await
        .unwrap();

    assert_eq!(detail.collection.title, "One Piece");
    assert_eq!(detail.author.map(|a| a.slug), Some("eiichiro-oda".to_string()));
    assert_eq!(detail.editor.map(|e| e.name), Some("Shueisha".to_string()));
    assert_eq!(detail.category.map(|c| c.name), Some("Shonen".to_string()));
    assert_eq!(detail.tags.len(), 2);
    assert_eq!(detail.editions.len(), 1);
    assert_eq!(detail.editions[0].edition.slug, "original");
    assert_eq!(detail.editions[0].volumes_count, 3);
    assert_eq!(detail.editions[0].volumes.len(), 3);

    let missing = catalog_service::collection_detail(&state, "bleach").await;
    assert!(matches!(missing, Err(DomainError::NotFound("Collection"))));
}

#[tokio::test]
async fn test_volumes_of_edition_are_paged_with_context() {
    let state = setup_catalog().await;

    let page = volumes_in_edition(
        &*state.volume_repo,
        "one-piece",
        "original",
        PageRequest::new(2, 2),
    )
    .await
    .unwrap();

    assert_eq!(page.count, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    let view = &page.items[0];
    assert_eq!(view.volume.number, 3);

    let edition = view.edition.as_ref().expect("edition loaded");
    let collection = edition.collection.as_ref().expect("collection loaded");
    assert_eq!(collection.collection.slug, "one-piece");
    assert_eq!(
        collection.author.as_ref().map(|a| a.surname.as_str()),
        Some("Oda")
    );
    assert!(collection.editor.is_some());
}

#[tokio::test]
async fn test_collection_title_must_be_unique() {
    let state = setup_catalog().await;

    let payload: mangatheque::domain::NewCollection = serde_json::from_value(serde_json::json!({
        "title": "Naruto"
    }))
    .unwrap();
    let result = catalog_service::create_collection(&state, payload).await;

    assert!(matches!(result, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn test_huge_page_or_size_returns_an_empty_page() {
    let state = setup_catalog().await;

    let far = search_collections(
        &*state.collection_repo,
        &SearchCriteria::CategorySlug("shonen".to_string()),
        PageRequest::new(i64::MAX, 10),
    )
    .await
    .unwrap();
    assert_eq!(far.page, i64::MAX);
    assert_eq!(far.total_pages, 1);
    assert!(far.items.is_empty());

    let wide = search_collections(
        &*state.collection_repo,
        &SearchCriteria::CategorySlug("shonen".to_string()),
        PageRequest::new(1, i64::MAX),
    )
    .await
    .unwrap();
    assert_eq!(wide.count, 2);
    assert_eq!(wide.items.len(), 2);

    let past = search_collections(
        &*state.collection_repo,
        &SearchCriteria::CategorySlug("shonen".to_string()),
        PageRequest::new(3, i64::MAX),
    )
    .await
    .unwrap();
    assert!(past.items.is_empty());

    let volumes = volumes_in_edition(
        &*state.volume_repo,
        "one-piece",
        "original",
        PageRequest::new(i64::MAX, i64::MAX),
    )
    .await
    .unwrap();
    assert_eq!(volumes.count, 3);
    assert!(volumes.items.is_empty());
}

#[tokio::test]
async fn test_rename_recomputes_slug_only_when_it_changes() {
    let state = setup_catalog().await;
    let one_piece = catalog_service::collection_detail(&state, "one-piece")
        .await
        .unwrap()
        .collection;

    let respaced = catalog_service::update_collection(
        &state,
        one_piece.id,
        CollectionPatch {
            title: Some("One   Piece ".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(respaced.title, "One   Piece ");
    assert_eq!(respaced.slug, "one-piece");

    let renamed = catalog_service::update_collection(
        &state,
        one_piece.id,
        CollectionPatch {
            title: Some("One Piece Deluxe".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.slug, "one-piece-deluxe");

    let detail = catalog_service::collection_detail(&state, "one-piece-deluxe")
        .await
        .unwrap();
    assert_eq!(detail.collection.id, one_piece.id);
    let old = catalog_service::collection_detail(&state, "one-piece").await;
    assert!(matches!(old, Err(DomainError::NotFound("Collection"))));

    let blank = catalog_service::update_collection(
        &state,
        one_piece.id,
        CollectionPatch {
            title: Some("   ".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(blank, Err(DomainError::InvalidArgument(_))));
}
