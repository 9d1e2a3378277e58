//! Roster API Server
//!
//! Users, groups and group membership over HTTP, backed by PostgreSQL.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sea_orm::{ConnectOptions, Database};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;
mod routes;

#[cfg(test)]
mod test_utils;


use adapters::{ensure_schema, PostgresGroupRepository, PostgresUserRepository};
use app::{GroupService, UserService};
use config::Config;
use domain::ports::{GroupRepository, UserRepository};

/// Application state shared across all handlers
pub struct AppState<UR: UserRepository, GR: GroupRepository> {
    pub user_service: Arc<UserService<UR, GR>>,
    pub group_service: Arc<GroupService<UR, GR>>,
}

impl<UR, GR> AppState<UR, GR>
where
    UR: UserRepository,
    GR: GroupRepository,
{
    pub fn new(users: Arc<UR>, groups: Arc<GR>) -> Self {
        Self {
            user_service: Arc::new(UserService::new(users.clone(), groups.clone())),
            group_service: Arc::new(GroupService::new(users, groups)),
        }
    }
}

impl<UR: UserRepository, GR: GroupRepository> Clone for AppState<UR, GR> {
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            group_service: Arc::clone(&self.group_service),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,roster_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Roster API...");

    let config = Config::from_env()?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .context("failed to connect to database")?;
    tracing::info!("Database connected");

    if config.run_migrations {
        ensure_schema(&db)
            .await
            .context("failed to apply database schema")?;
    }

    let users = Arc::new(PostgresUserRepository::new(db.clone()));
    let groups = Arc::new(PostgresGroupRepository::new(db));
    let app = routes::router(AppState::new(users, groups));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
