use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use super::error::{ApiError, ApiResult};
use crate::auth::{create_jwt, hash_password, verify_password};
use crate::domain::NewUser;
use crate::infrastructure::AppState;
use crate::models::Role;
use crate::services::catalog_service::{validate_date, validate_name};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    email: String,
    password: String,
    name: Option<String>,
    surname: Option<String>,
    picture: Option<String>,
    date_of_birth: Option<String>,
    gender: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid credentials" })),
    )
        .into_response()
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_name("email", &payload.email)?;
    validate_name("password", &payload.password)?;
    validate_date("dateOfBirth", payload.date_of_birth.as_deref())?;

    let password_hash = hash_password(&payload.password).map_err(ApiError::Internal)?;
    let user = state
        .user_repo
        .create(NewUser {
            name: payload.name,
            surname: payload.surname,
            email: payload.email,
            password_hash,
            picture: payload.picture,
            date_of_birth: payload.date_of_birth,
            gender: payload.gender,
            role: Role::User,
        })
        .await?;

    tracing::info!("User {} registered", user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<axum::response::Response> {
    tracing::info!("Login attempt for {}", payload.email);

    let Some(user) = state.user_repo.find_by_email(&payload.email).await? else {
        tracing::warn!("Unknown email: {}", payload.email);
        return Ok(invalid_credentials());
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {
            let token = create_jwt(user.id, &user.email, user.role).map_err(ApiError::Internal)?;
            tracing::info!("User {} logged in", user.id);
            Ok((StatusCode::OK, Json(json!({ "token": token }))).into_response())
        }
        _ => {
            tracing::warn!("Password verification failed for user {}", user.id);
            Ok(invalid_credentials())
        }
    }
}
