use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::ConnectionTrait;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use mangatheque::auth::create_jwt;
use mangatheque::domain::NewUser;
use mangatheque::infrastructure::AppState;
use mangatheque::models::Role;
use mangatheque::{db, seed, server};

async fn setup_app() -> (Router, AppState) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    seed::seed_demo_data(&db)
        .await
        .expect("Failed to seed catalog");
    let state = AppState::new(db);
    (server::build_router(state.clone(), &[]), state)
}

async fn token_for(state: &AppState, email: &str, role: Role) -> String {
    let user = state
        .user_repo
        .create(NewUser {
            name: None,
            surname: None,
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            picture: None,
            date_of_birth: None,
            gender: None,
            role,
        })
        .await
        .expect("Failed to create user");
    create_jwt(user.id, &user.email, user.role).expect("Failed to create JWT")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "mangatheque");
}

#[tokio::test]
async fn test_search_items_carry_page_metadata() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, get("/api/collections/search?title=Nar&pageNumber=1&limit=5")).await;

    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().expect("array body");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Naruto");
    assert_eq!(items[0]["slug"], "naruto");
    assert_eq!(items[0]["totalPages"], 1);
    assert_eq!(items[0]["count"], 1);
    assert_eq!(items[0]["pageNumber"], 1);
    assert_eq!(items[0]["categoriesFound"], json!(["Shonen"]));
}

#[tokio::test]
async fn test_invalid_limit_is_bad_request() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, get("/api/collections/newest?limit=0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_slug_is_not_found() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, get("/api/collections/by-slug/bleach")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Collection not found");
}

#[tokio::test]
async fn test_library_requires_token() {
    let (app, _) = setup_app().await;

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/library", None, json!({ "volumeId": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_plain_users() {
    let (app, state) = setup_app().await;
    let token = token_for(&state, "reader@example.com", Role::User).await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/collections",
            Some(&token),
            json!({ "title": "Bleach" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin role required");
}

#[tokio::test]
async fn test_admin_creates_collection_with_slug() {
    let (app, state) = setup_app().await;
    let token = token_for(&state, "admin@example.com", Role::Admin).await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/collections",
            Some(&token),
            json!({ "title": "Fullmetal Alchemist", "releaseDate": "2001-07-12" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["slug"], "fullmetal-alchemist");
    assert_eq!(body["followNumber"], 0);

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/collections",
            Some(&token),
            json!({ "title": "Fullmetal Alchemist" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_library_flow_over_http() {
    let (app, state) = setup_app().await;
    let token = token_for(&state, "reader@example.com", Role::User).await;
    let other = token_for(&state, "other@example.com", Role::User).await;

    let (status, entry) = send(
        &app,
        json_request(Method::POST, "/api/library", Some(&token), json!({ "volumeId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["isRead"], false);
    let entry_id = entry["id"].as_i64().unwrap();

    let uri = format!("/api/library/{}/read", entry_id);
    let (status, _) = send(&app, json_request(Method::PATCH, &uri, Some(&other), json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, toggled) = send(&app, json_request(Method::PATCH, &uri, Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["isRead"], true);

    let me = Request::builder()
        .uri("/api/users/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, profile) = send(&app, me).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["countVolume"], 1);
    assert_eq!(profile["countVolumeRead"], 1);
    assert!(profile.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_then_login() {
    let (app, _) = setup_app().await;
    let credentials = json!({ "email": "new@example.com", "password": "manga-lover" });

    let (status, user) = send(
        &app,
        json_request(Method::POST, "/api/auth/register", None, credentials.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["role"], "user");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/auth/login", None, credentials),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "new@example.com", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_persistence_failure_hides_driver_text() {
    let (app, state) = setup_app().await;
    state
        .db()
        .execute_unprepared("DROP TABLE wish_list")
        .await
        .unwrap();
    let token = token_for(&state, "reader@example.com", Role::User).await;

    let (status, body) = send(
        &app,
        json_request(Method::PATCH, "/api/volumes/1/wishlist", Some(&token), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_collection_lookups_by_taxonomy_id() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, get("/api/editions/collection/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["slug"], "original");

    let (status, _) = send(&app, get("/api/editions/collection/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get("/api/tags/collections")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(4));
    assert!(body[0]["collections"].is_array());

    let tag_id = body[0]["id"].as_i64().expect("tag id");
    let (status, body) = send(&app, get(&format!("/api/tags/{}/collections", tag_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Adventure");
    assert_eq!(body["collections"].as_array().map(Vec::len), Some(2));

    let (status, body) = send(&app, get("/api/editors/1/collections")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collections"].as_array().map(Vec::len), Some(3));

    let (status, body) = send(&app, get("/api/categories/1/collections")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Shonen");
}

#[tokio::test]
async fn test_huge_page_number_is_an_empty_page() {
    let (app, _) = setup_app().await;

    let uri = format!(
        "/api/collections/categories/search?categoryName=shonen&pageNumber={}&limit={}",
        i64::MAX,
        i64::MAX
    );
    let (status, body) = send(&app, get(&uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_rename_over_http_keeps_slug_until_title_changes() {
    let (app, state) = setup_app().await;
    let token = token_for(&state, "admin@example.com", Role::Admin).await;

    let (status, body) = send(
        &app,
        json_request(Method::PATCH, "/api/collections/1", Some(&token), json!({ "title": "One   Piece " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "one-piece");

    let (status, body) = send(
        &app,
        json_request(Method::PATCH, "/api/collections/1", Some(&token), json!({ "title": "One Piece Deluxe" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "one-piece-deluxe");

    let (status, _) = send(&app, get("/api/collections/by-slug/one-piece-deluxe")).await;
    assert_eq!(status, StatusCode::OK);
}
