//! Shared fixtures for handler tests: in-memory backends, temp directories and
//! a router built exactly like the production one.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::Config;
use crate::models::{Portfolio, PortfolioFields};
use crate::payment::fake::FakePaymentProvider;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::memory::MemoryAssetStorage;
use crate::store::memory::MemoryPortfolioStore;
use crate::store::PortfolioStore;
use crate::templates::test_files::write_template;
use crate::templates::TemplateId;

pub const SITE: &str = "http://folio.test";

pub fn test_config(templates_dir: &Path, public_dir: &Path) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        s3_bucket: "folio-test".to_string(),
        s3_endpoint: "http://localhost:9000".to_string(),
        s3_public_base_url: "http://localhost:9000".to_string(),
        aws_access_key_id: "test".to_string(),
        aws_secret_access_key: "test".to_string(),
        stripe_secret_key: "sk_test".to_string(),
        stripe_price_id: "price_test".to_string(),
        site_base_url: SITE.to_string(),
        templates_dir: templates_dir.to_path_buf(),
        public_dir: public_dir.to_path_buf(),
        bypass_payment: false,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryPortfolioStore>,
    pub storage: Arc<MemoryAssetStorage>,
    pub payments: Arc<FakePaymentProvider>,
    pub templates: TempDir,
    pub public: TempDir,
}

impl TestApp {
    /// Every template id gets the sample template; output goes to a fresh temp dir.
    pub fn new() -> Self {
        Self::with_backends(MemoryAssetStorage::default(), FakePaymentProvider::default())
    }

    pub fn with_backends(storage: MemoryAssetStorage, payments: FakePaymentProvider) -> Self {
        let templates = tempfile::tempdir().unwrap();
        let public = tempfile::tempdir().unwrap();
        for id in TemplateId::ALL {
            write_template(templates.path(), id);
        }

        let store = Arc::new(MemoryPortfolioStore::default());
        let storage = Arc::new(storage);
        let payments = Arc::new(payments);
        let state = AppState {
            store: store.clone(),
            storage: storage.clone(),
            payments: payments.clone(),
            config: test_config(templates.path(), public.path()),
        };

        TestApp {
            state,
            store,
            storage,
            payments,
            templates,
            public,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Stores a portfolio owned by `owner` and returns it.
    pub async fn seed(&self, owner: &str, fields: PortfolioFields) -> Portfolio {
        let portfolio = Portfolio::new(owner, fields);
        self.store.insert(&portfolio).await.unwrap();
        portfolio
    }

    pub fn output_dir(&self, portfolio: &Portfolio) -> std::path::PathBuf {
        self.public
            .path()
            .join("portfolios")
            .join(portfolio.id.to_string())
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
