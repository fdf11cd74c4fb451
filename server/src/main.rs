//! Cambio Server Binary
//!
//! Exposes currency conversion, rate lookup, and transaction history over
//! HTTP, backed by a PostgreSQL store and an external rate provider.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cambio_fx::{ConversionService, HttpRateProvider, RateEngine, TransactionStore};
use cambio_server::{router, AppState, ServerConfig};
use cambio_store::{PgRateStore, PgTransactionStore, MIGRATOR};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting Cambio server");

    // Load configuration
    let config = ServerConfig::from_env();
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    MIGRATOR.run(&pool).await?;

    let provider = Arc::new(HttpRateProvider::new(
        config.provider_url.clone(),
        config.provider_access_key.clone(),
        config.provider_timeout,
    )?);

    let rate_store = Arc::new(PgRateStore::new(pool.clone()));
    let transactions: Arc<dyn TransactionStore> = Arc::new(PgTransactionStore::new(pool.clone()));

    let rates = Arc::new(RateEngine::new(
        provider,
        rate_store,
        config.engine_config(),
    ));
    let conversions = ConversionService::new(rates.clone(), transactions.clone());

    let state = Arc::new(AppState {
        rates,
        conversions,
        transactions,
    });
    let app = router(state);

    let addr = format!("{}:{}", config.listen_addr, config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");
    info!("Shutdown signal received");
}
