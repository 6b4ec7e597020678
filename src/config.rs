use std::net::SocketAddr;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://users.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// `users` table in a SQLite database.
    Sqlite,
    /// Process-local table, lost on exit.
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageBackend,
    pub database_url: String,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_string =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bind_addr = env_string("USERS_API_BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse::<SocketAddr>()
            .context("USERS_API_BIND_ADDR must be a valid host:port")?;

        let storage = StorageBackend::from_str(&env_string("USERS_API_STORAGE", "sqlite"), true)
            .map_err(|_| anyhow!("USERS_API_STORAGE must be one of: sqlite, memory"))?;

        let database_url = env_string("DATABASE_URL", DEFAULT_DATABASE_URL);

        let db_max_connections = env_string("USERS_API_DB_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .context("USERS_API_DB_MAX_CONNECTIONS must be u32")?;

        Ok(Self {
            bind_addr,
            storage,
            database_url,
            db_max_connections,
        })
    }
}
