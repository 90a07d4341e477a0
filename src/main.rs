use std::sync::Arc;

use anyhow::Context;
use wellness_tracker::config::Config;
use wellness_tracker::db::{self, KvStore, MemoryKv};
use wellness_tracker::{server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wellness_tracker=debug,wellness_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    let kv = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url)
                .await
                .context("Failed to create database pool")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");
            KvStore::Postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, keeping data in memory");
            KvStore::Memory(MemoryKv::new())
        }
    };

    let state = AppState {
        kv,
        config: config.clone(),
    };

    let addr = config.listen_addr();
    tracing::info!(prefix = %config.service_prefix, "Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    server::serve(listener, state).await?;
    Ok(())
}
