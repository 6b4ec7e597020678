// ============================================================================
// users_api: CRUD REST API for the User resource
// ============================================================================

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod state;

pub use app::build_router;
pub use application::user_service::UserService;
pub use config::{AppConfig, StorageBackend};
pub use domain::errors::DomainError;
pub use infrastructure::{InMemoryUserRepository, SqliteUserRepository, UserRepository};
pub use state::AppState;
