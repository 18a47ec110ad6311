// Declare existing modules
pub mod jwt;
pub mod password;

// Declare submodules
pub mod auth_dto;
pub mod auth_handlers;
pub mod auth_service;

// Re-export public items
pub use auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
pub use auth_service::AuthService;
pub use jwt::{create_access_token, verify_jwt, Claims};
pub use password::{hash_password, verify_password};
