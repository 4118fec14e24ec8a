//! Openlot JSON API server entry point.
//!
//! Startup order matters: configuration, database, migrations, then the
//! listener. Migrations run explicitly before the first request is accepted;
//! there is no lazy first-request init.

mod auth;
mod config;
mod error;
mod flags;
mod handlers;
mod router;
mod state;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use openlot_db::{Database, DbConfig};

use config::AppConfig;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,openlot=debug")),
        )
        .init();

    let config = AppConfig::load()?;
    info!(port = config.http_port, db = %config.database_path, "Starting openlot-web");

    let db = Database::new(
        DbConfig::new(&config.database_path)
            .busy_timeout(config.busy_timeout())
            .run_migrations(false),
    )
    .await?;
    db.run_migrations().await?;

    let state = AppState::new(db, &config);
    let app = router::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
