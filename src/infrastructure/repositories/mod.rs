//! Repository implementations using SeaORM

pub mod collection_repository;
pub mod library_repository;
pub mod user_repository;
pub mod volume_repository;

pub use collection_repository::SeaOrmCollectionRepository;
pub use library_repository::SeaOrmLibraryRepository;
pub use user_repository::SeaOrmUserRepository;
pub use volume_repository::SeaOrmVolumeRepository;
