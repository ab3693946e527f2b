//! Server entry point: tracing, configuration, store selection, serve.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use ams_auth::{CredentialStore, MemoryCredentialStore};

use ams_api::config::AppConfig;
use ams_api::db::{self, PgCredentialStore};
use ams_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let db_pool = db::init_pool().await?;
    let store: Arc<dyn CredentialStore> = match &db_pool {
        Some(pool) => Arc::new(PgCredentialStore::new(pool.clone())),
        None => Arc::new(MemoryCredentialStore::new()),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config, store, db_pool);
    let app = ams_api::app(state);

    tracing::info!("ams-api listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
