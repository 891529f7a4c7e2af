//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{CollectionRepository, LibraryRepository, UserRepository, VolumeRepository};
use crate::infrastructure::config::DEFAULT_PAGE_SIZE;
use crate::infrastructure::{
    SeaOrmCollectionRepository, SeaOrmLibraryRepository, SeaOrmUserRepository,
    SeaOrmVolumeRepository,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Direct access for the taxonomy entities
    db: DatabaseConnection,
    pub collection_repo: Arc<dyn CollectionRepository>,
    pub volume_repo: Arc<dyn VolumeRepository>,
    pub library_repo: Arc<dyn LibraryRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    /// Page size for listings requested without `limit`
    pub default_page_size: i64,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        let collection_repo = Arc::new(SeaOrmCollectionRepository::new(db.clone()));
        let volume_repo = Arc::new(SeaOrmVolumeRepository::new(db.clone()));
        let library_repo = Arc::new(SeaOrmLibraryRepository::new(db.clone()));
        let user_repo = Arc::new(SeaOrmUserRepository::new(db.clone()));

        Self {
            db,
            collection_repo,
            volume_repo,
            library_repo,
            user_repo,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.default_page_size = page_size;
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl AsRef<DatabaseConnection> for AppState {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
