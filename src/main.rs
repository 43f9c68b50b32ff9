use anyhow::Context;
use tracing_subscriber::EnvFilter;

use todo_api_rust::app::{router, AppState};
use todo_api_rust::auth::KeyPair;
use todo_api_rust::config;
use todo_api_rust::database::{Datastore, MemoryStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, key paths, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config().clone();
    tracing::info!("Starting {} in {:?} mode", config.server.server_name, config.environment);

    // Keys are required; without them no session can be issued or checked
    let keys = KeyPair::load(&config.jwt.private_key_path, &config.jwt.public_key_path)
        .context("failed to load RSA key pair")?;

    let mut pool = None;
    let store = match config.database.url.as_deref() {
        Some(url) => {
            let pg = PgStore::connect(url, &config.database)
                .await
                .context("failed to connect to Postgres")?;
            pg.migrate().await.context("failed to prepare database schema")?;
            pool = Some(pg.clone());
            Datastore::from_backend(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on exit");
            Datastore::from_backend(MemoryStore::new())
        }
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::new(config, keys, store).context("invalid token lifetime configuration")?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pg) = pool {
        pg.close().await;
        tracing::info!("Database pool closed");
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
