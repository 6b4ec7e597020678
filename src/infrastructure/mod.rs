use async_trait::async_trait;

use crate::domain::{
    errors::DomainError,
    user::{NewUser, User, UserChanges},
};

pub mod in_memory_user_repository;
pub mod sqlite_user_repository;

pub use in_memory_user_repository::InMemoryUserRepository;
pub use sqlite_user_repository::SqliteUserRepository;

/// The `users` table.
///
/// Implementations enforce email uniqueness on write as a backstop for the
/// read-check-then-write done by [`crate::application::user_service::UserService`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates the table if it does not exist yet.
    async fn init(&self) -> Result<(), DomainError>;
    /// Drops and recreates the table.
    async fn reset(&self) -> Result<(), DomainError>;
    /// Removes every row but keeps the id sequence.
    async fn clear(&self) -> Result<(), DomainError>;
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    /// All users in creation order.
    async fn list(&self) -> Result<Vec<User>, DomainError>;
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, DomainError>;
    /// Returns the removed row, or `None` when `id` is unknown.
    async fn delete(&self, id: i64) -> Result<Option<User>, DomainError>;
}
