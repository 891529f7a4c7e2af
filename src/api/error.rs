//! Mapping of service failures onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::auth::Claims;

#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    /// Authenticated, but the role does not allow the operation
    Forbidden,
    /// Request-level failure outside the domain (hashing, token issuing)
    Internal(String),
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError::Domain(e)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(e: sea_orm::DbErr) -> Self {
        ApiError::Domain(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Domain(DomainError::NotFound(entity)) => {
                (StatusCode::NOT_FOUND, format!("{} not found", entity))
            }
            ApiError::Domain(DomainError::Unauthorized) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            ApiError::Domain(DomainError::InvalidArgument(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(DomainError::Conflict(msg)) => (StatusCode::CONFLICT, msg),
            ApiError::Domain(DomainError::Persistence(detail)) => {
                tracing::error!("Persistence failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Admin role required".to_string()),
            ApiError::Internal(detail) => {
                tracing::error!("Request failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Role guard for admin-only routes
pub fn require_admin(claims: &Claims) -> Result<(), ApiError> {
    if claims.is_admin() {
        Ok(())
    } else {
        tracing::warn!("User {} denied admin route", claims.user_id());
        Err(ApiError::Forbidden)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
