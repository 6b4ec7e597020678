use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};
use tracing::debug;

use crate::{
    domain::{
        errors::DomainError,
        user::{NewUser, User, UserChanges},
    },
    infrastructure::UserRepository,
};

// AUTOINCREMENT keeps ids monotonic: SQLite never hands out a rowid that was
// used by a deleted row. Listing orders by id for the same reason.
const CREATE_USERS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    username     TEXT    NOT NULL,
    email        TEXT    NOT NULL UNIQUE,
    active       BOOLEAN NOT NULL DEFAULT 1,
    created_date TEXT    NOT NULL
)
"#;

const DROP_USERS_TABLE_SQL: &str = "DROP TABLE IF EXISTS users";

const USER_COLUMNS: &str = "id, username, email, active, created_date";

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url`, creating the database file if needed.
    ///
    /// An in-memory database lives only as long as its connection, so for
    /// `sqlite::memory:` the pool is pinned to a single connection that is
    /// never recycled.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options)
                .await?
        };

        debug!(database_url, "sqlite pool opened");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn init(&self) -> Result<(), DomainError> {
        sqlx::query(CREATE_USERS_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), DomainError> {
        sqlx::query(DROP_USERS_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        self.init().await
    }

    async fn clear(&self) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (username, email, active, created_date) \
             VALUES (?, ?, 1, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_write_error(err, &user.email))?;

        row_to_user(&row)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let maybe_row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        maybe_row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let maybe_row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        maybe_row.as_ref().map(row_to_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_user).collect()
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, DomainError> {
        let maybe_row = sqlx::query(&format!(
            "UPDATE users SET username = ?, email = ? WHERE id = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| map_write_error(err, &changes.email))?;

        maybe_row.as_ref().map(row_to_user).transpose()
    }

    async fn delete(&self, id: i64) -> Result<Option<User>, DomainError> {
        let maybe_row = sqlx::query(&format!(
            "DELETE FROM users WHERE id = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        maybe_row.as_ref().map(row_to_user).transpose()
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn row_to_user(row: &SqliteRow) -> Result<User, DomainError> {
    Ok(User {
        id: row.try_get::<i64, _>("id").map_err(map_sqlx_error)?,
        username: row.try_get::<String, _>("username").map_err(map_sqlx_error)?,
        email: row.try_get::<String, _>("email").map_err(map_sqlx_error)?,
        active: row.try_get::<bool, _>("active").map_err(map_sqlx_error)?,
        created_date: row
            .try_get::<DateTime<Utc>, _>("created_date")
            .map_err(map_sqlx_error)?,
    })
}

fn map_write_error(error: sqlx::Error, email: &str) -> DomainError {
    let is_unique_violation = error
        .as_database_error()
        .is_some_and(|db_error| db_error.is_unique_violation());

    if is_unique_violation {
        DomainError::conflict(email)
    } else {
        map_sqlx_error(error)
    }
}

fn map_sqlx_error(error: sqlx::Error) -> DomainError {
    DomainError::storage(error.to_string())
}
