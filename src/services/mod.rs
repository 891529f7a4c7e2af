//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.
//! Handlers call services; services call repositories or SeaORM directly.

pub mod catalog_service;
pub mod library_service;
pub mod search_service;
pub mod taxonomy_service;

// Re-export for convenience
pub use search_service::{SearchCriteria, SearchPage};
