//! OU Gym backend binary.
//!
//! Loads configuration from the environment, wires the PostgreSQL adapters
//! into the billing router, and serves the API.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ougym_backend::adapters::email::{NoopNotifier, ResendMailer};
use ougym_backend::adapters::http::billing::{billing_router, BillingAppState};
use ougym_backend::adapters::postgres::{
    PostgresBillingStore, PostgresMemberDirectory, PostgresMembershipReader,
    PostgresPackageCatalog,
};
use ougym_backend::config::AppConfig;
use ougym_backend::ports::SettlementNotifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;

    let store = Arc::new(PostgresBillingStore::new(pool.clone()));
    let reader = Arc::new(PostgresMembershipReader::new(pool.clone()));
    let catalog = Arc::new(PostgresPackageCatalog::new(pool.clone()));

    let notifier: Arc<dyn SettlementNotifier> = if config.email.is_enabled() {
        let directory = Arc::new(PostgresMemberDirectory::new(pool.clone()));
        Arc::new(ResendMailer::new(&config.email, directory))
    } else {
        info!("email disabled, settlement confirmations will not be sent");
        Arc::new(NoopNotifier)
    };

    let state = BillingAppState::new(store, reader, catalog, notifier, &config.vnpay);

    let app = axum::Router::new()
        .nest("/api", billing_router())
        .route("/health", axum::routing::get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .with_state(state);

    let addr = config.server.socket_addr();
    info!(%addr, environment = ?config.server.environment, "starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
