use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use users_api::{
    AppConfig, AppState, InMemoryUserRepository, SqliteUserRepository, StorageBackend,
    UserRepository, UserService, build_router,
};

#[derive(Parser)]
#[command(name = "users-api")]
#[command(about = "CRUD REST API for users", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Listen address, overrides USERS_API_BIND_ADDR
    #[arg(long, global = true)]
    bind: Option<SocketAddr>,

    /// Storage backend, overrides USERS_API_STORAGE
    #[arg(long, global = true, value_enum)]
    storage: Option<StorageBackend>,

    /// SQLite URL, overrides DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Drop and recreate the users table
    RecreateDb,
    /// Insert the default users
    SeedDb,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(storage) = self.storage {
            config.storage = storage;
        }
        if let Some(database_url) = &self.database_url {
            config.database_url = database_url.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("failed to load configuration")?;
    cli.apply(&mut config);

    let repository = open_repository(&config).await?;
    repository
        .init()
        .await
        .context("failed to initialize users schema")?;
    let service = Arc::new(UserService::new(repository));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, service).await,
        Command::RecreateDb => service
            .recreate_schema()
            .await
            .context("failed to recreate users table"),
        Command::SeedDb => service
            .seed()
            .await
            .map(|_| ())
            .context("failed to seed users"),
    }
}

async fn open_repository(config: &AppConfig) -> Result<Arc<dyn UserRepository>> {
    let repository: Arc<dyn UserRepository> = match config.storage {
        StorageBackend::Sqlite => {
            info!(database_url = %config.database_url, "storage backend: sqlite");
            let repository =
                SqliteUserRepository::connect(&config.database_url, config.db_max_connections)
                    .await
                    .with_context(|| format!("failed to open {}", config.database_url))?;
            Arc::new(repository)
        }
        StorageBackend::Memory => {
            info!("storage backend: memory");
            Arc::new(InMemoryUserRepository::new())
        }
    };
    Ok(repository)
}

async fn serve(config: &AppConfig, service: Arc<UserService>) -> Result<()> {
    let app = build_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(bind_addr = %config.bind_addr, "users API started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("users API stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("users_api=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install ctrl+c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install sigterm handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
