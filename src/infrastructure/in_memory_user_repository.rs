use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        errors::DomainError,
        user::{NewUser, User, UserChanges},
    },
    infrastructure::UserRepository,
};

#[derive(Debug, Default)]
struct UserTable {
    rows: BTreeMap<i64, User>,
    last_id: i64,
}

impl UserTable {
    fn email_owner(&self, email: &str) -> Option<&User> {
        self.rows.values().find(|user| user.email == email)
    }
}

/// Process-local table; ids come from a counter that is never rewound by
/// deletes, so iteration order over the `BTreeMap` is creation order.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn init(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn reset(&self) -> Result<(), DomainError> {
        *self.table.write().await = UserTable::default();
        Ok(())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.table.write().await.rows.clear();
        Ok(())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut table = self.table.write().await;
        if table.email_owner(&user.email).is_some() {
            return Err(DomainError::conflict(user.email));
        }

        table.last_id += 1;
        let created = User {
            id: table.last_id,
            username: user.username,
            email: user.email,
            active: true,
            created_date: Utc::now(),
        };
        table.rows.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.table.read().await.email_owner(email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, DomainError> {
        let mut table = self.table.write().await;
        if table
            .email_owner(&changes.email)
            .is_some_and(|owner| owner.id != id)
        {
            return Err(DomainError::conflict(changes.email));
        }

        let Some(user) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        user.username = changes.username;
        user.email = changes.email;

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.table.write().await.rows.remove(&id))
    }
}
