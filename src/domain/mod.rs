//! Domain layer - Pure business abstractions
//!
//! Repository contracts, read models, and the pure rules of the catalog
//! (pagination windows, slugs). No Axum here.

pub mod errors;
pub mod pagination;
pub mod repositories;
pub mod slug;
pub mod views;

pub use errors::DomainError;
pub use pagination::{paginate, PageRequest, PageWindow};
pub use repositories::*;
pub use views::*;
