// src/main.rs

use std::{net::SocketAddr, sync::Arc, time::Duration};

use adaptive_tutor::{
    config::Config,
    routes,
    services::{LearningEngine, generator::OllamaGenerator},
    state::AppState,
    store::{MemoryProficiencyStore, PgProficiencyStore, ProficiencyStore},
};
use dotenvy::dotenv;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DB_CONNECT_RETRIES: u32 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Load configuration from environment
    let config = Config::from_env();

    let store: Arc<dyn ProficiencyStore> = match &config.database_url {
        Some(url) => {
            let pool = connect_with_retry(url).await?;
            tracing::info!("Database connected...");

            // Run Migrations Automatically
            tracing::info!("Running migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations applied successfully.");

            Arc::new(PgProficiencyStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, learner data is kept in memory only");
            Arc::new(MemoryProficiencyStore::new())
        }
    };

    tracing::info!(
        model = %config.ollama.model,
        base_url = %config.ollama.base_url,
        "Using Ollama generator"
    );
    let generator = Arc::new(OllamaGenerator::new(config.ollama.clone()));

    // Create AppState
    let state = AppState {
        engine: Arc::new(LearningEngine::new(store, generator, &config)),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start the server
    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize Database Pool with Retry
async fn connect_with_retry(url: &str) -> Result<PgPool, sqlx::Error> {
    let mut retry_count = 0;
    loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(url)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(e) => {
                retry_count += 1;
                if retry_count > DB_CONNECT_RETRIES {
                    tracing::error!(
                        "Failed to connect to database after {} retries",
                        DB_CONNECT_RETRIES
                    );
                    return Err(e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}
