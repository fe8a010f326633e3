mod config;
mod db;
mod editor;
mod errors;
mod extract;
mod generation;
mod models;
mod payment;
mod portfolios;
mod preview;
mod routes;
mod state;
mod storage;
mod store;
mod templates;
mod viewer;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::payment::StripeClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3AssetStorage;
use crate::store::PgPortfolioStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs pending migrations)
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgPortfolioStore::new(db));

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let storage = Arc::new(S3AssetStorage::new(
        s3,
        config.s3_bucket.clone(),
        config.s3_public_base_url.clone(),
    ));
    info!("S3 asset storage initialized (bucket: {})", config.s3_bucket);

    // Initialize Stripe
    let payments = Arc::new(StripeClient::new(
        config.stripe_secret_key.clone(),
        config.stripe_price_id.clone(),
    )?);
    info!("Stripe client initialized (price: {})", config.stripe_price_id);

    if config.bypass_payment {
        warn!("BYPASS_PAYMENT is set: every portfolio is publicly viewable");
    }
    tokio::fs::create_dir_all(config.portfolios_output_dir()).await?;
    info!(
        "Templates from {}, publishing to {}",
        config.templates_dir.display(),
        config.portfolios_output_dir().display()
    );

    // Build app state
    let state = AppState {
        store,
        storage,
        payments,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to SITE_BASE_URL once the editor is served from it

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "folio-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
