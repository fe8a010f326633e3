pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::state::AppState;
use crate::{editor, generation, payment, portfolios, preview, viewer};

/// Upper bound for one multipart asset request.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let published = ServeDir::new(state.config.portfolios_output_dir());

    Router::new()
        .route("/health", get(health::health_handler))
        // Portfolio documents
        .route(
            "/api/portfolios",
            get(portfolios::handlers::handle_list).post(portfolios::handlers::handle_create),
        )
        .route(
            "/api/portfolios/generate",
            post(generation::handlers::handle_generate),
        )
        .route(
            "/api/portfolios/:id",
            get(portfolios::handlers::handle_get)
                .put(portfolios::handlers::handle_update)
                .delete(portfolios::handlers::handle_delete),
        )
        .route(
            "/api/portfolios/:id/assets",
            post(portfolios::uploads::handle_upload_assets)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Templates and live editing
        .route("/api/templates", get(preview::handlers::handle_list_templates))
        .route(
            "/api/preview-template",
            get(preview::handlers::handle_preview),
        )
        .route(
            "/api/editor/:id",
            post(editor::handlers::handle_editor_message),
        )
        // Payment gate
        .route(
            "/api/portfolios/:id/checkout",
            post(payment::handlers::handle_checkout),
        )
        .route(
            "/api/payments/confirm",
            get(payment::handlers::handle_confirm),
        )
        .route("/p/:key", get(viewer::handle_view))
        .route(
            "/p/:key/checkout",
            get(payment::handlers::handle_viewer_checkout),
        )
        .nest_service("/portfolios", published)
        .with_state(state)
}
