pub mod author;
pub mod category;
pub mod collection;
pub mod collection_tags;
pub mod edition;
pub mod editor;
pub mod library;
pub mod tag;
pub mod user;
pub mod volume;
pub mod wish_list;

pub use user::Role;
