//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Entity absent by id or slug
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Acting user does not own the targeted resource
    #[error("Unauthorized")]
    Unauthorized,
    /// Malformed input (pagination, dates, empty names)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Uniqueness or referential conflict
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Underlying store error. The message is driver text and must not reach clients.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Persistence(e.to_string())
    }
}
