use std::sync::Arc;

use crate::config::Config;
use crate::payment::PaymentProvider;
use crate::storage::AssetStorage;
use crate::store::PortfolioStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Portfolio documents. Default: Postgres.
    pub store: Arc<dyn PortfolioStore>,
    /// Uploaded files. Default: S3 / MinIO.
    pub storage: Arc<dyn AssetStorage>,
    /// Checkout provider. Default: Stripe.
    pub payments: Arc<dyn PaymentProvider>,
    pub config: Config,
}
