use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use streambite_api::db::{create_pool, create_redis_client, Cache};
use streambite_api::{create_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("streambite_api=debug,tower_http=info")
        }))
        .init();

    let config = Config::from_env()?;

    let db_pool = create_pool(&config.database_url)
        .await
        .context("Failed to set up the database pool")?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        db_pool,
        cache,
        config: Arc::new(config),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(addr = %addr, "StreamBite API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush queued cache writes before the process exits
    cache_writer.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        // No handler means no graceful trigger; keep serving until killed
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
