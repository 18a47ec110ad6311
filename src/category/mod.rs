pub mod category_dto;
pub mod category_handlers;
pub mod category_models;
pub mod category_repository;
pub mod category_service;

pub use category_dto::{CreateCategoryRequest, ReassignCategoryRequest};
pub use category_models::Category;
pub use category_repository::{CategoryRepository, PgCategoryRepository};
pub use category_service::{ensure_category_owned, CategoryService};
