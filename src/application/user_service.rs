use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    application::dto::{MessageResponse, UserPayload, UserResponse},
    domain::{errors::DomainError, user::NewUser},
    infrastructure::UserRepository,
};

/// Users inserted by `seed-db`.
pub const SEED_USERS: [(&str, &str); 2] = [
    ("admin", "admin@example.com"),
    ("demo", "demo@example.com"),
];

#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_user(&self, payload: UserPayload) -> Result<MessageResponse, DomainError> {
        if self
            .repository
            .find_by_email(&payload.email)
            .await?
            .is_some()
        {
            warn!(email = %payload.email, "rejected create with duplicate email");
            return Err(DomainError::conflict(payload.email));
        }

        let created = self.repository.create(payload.into_new_user()).await?;
        info!(user_id = created.id, email = %created.email, "user created");

        Ok(MessageResponse::new(format!("{} was added!", created.email)))
    }

    pub async fn get_user(&self, id: i64) -> Result<UserResponse, DomainError> {
        let Some(user) = self.repository.get_by_id(id).await? else {
            return Err(DomainError::not_found(id));
        };
        Ok(UserResponse::from(user))
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>, DomainError> {
        let users = self.repository.list().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn update_user(
        &self,
        id: i64,
        payload: UserPayload,
    ) -> Result<MessageResponse, DomainError> {
        if self.repository.get_by_id(id).await?.is_none() {
            return Err(DomainError::not_found(id));
        }

        if self
            .repository
            .find_by_email(&payload.email)
            .await?
            .is_some_and(|owner| owner.id != id)
        {
            warn!(user_id = id, email = %payload.email, "rejected update with duplicate email");
            return Err(DomainError::conflict(payload.email));
        }

        let Some(updated) = self.repository.update(id, payload.into_changes()).await? else {
            return Err(DomainError::not_found(id));
        };
        info!(user_id = updated.id, email = %updated.email, "user updated");

        Ok(MessageResponse::new(format!("{} was updated!", updated.id)))
    }

    pub async fn delete_user(&self, id: i64) -> Result<MessageResponse, DomainError> {
        let Some(removed) = self.repository.delete(id).await? else {
            return Err(DomainError::not_found(id));
        };
        info!(user_id = removed.id, email = %removed.email, "user removed");

        Ok(MessageResponse::new(format!("{} was removed!", removed.email)))
    }

    pub async fn recreate_schema(&self) -> Result<(), DomainError> {
        self.repository.reset().await?;
        info!("users table recreated");
        Ok(())
    }

    /// Inserts [`SEED_USERS`], skipping emails that are already taken.
    /// Returns how many rows were written.
    pub async fn seed(&self) -> Result<usize, DomainError> {
        let mut inserted = 0;
        for (username, email) in SEED_USERS {
            if self.repository.find_by_email(email).await?.is_some() {
                continue;
            }
            self.repository
                .create(NewUser {
                    username: username.to_string(),
                    email: email.to_string(),
                })
                .await?;
            inserted += 1;
        }
        info!(inserted, "seed users written");
        Ok(inserted)
    }
}
