//! Axum route handlers for portfolio documents.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::generation::handlers::{load_portfolio, parse_portfolio_id};
use crate::models::{Portfolio, PortfolioFields};
use crate::portfolios::validation::validate_fields;
use crate::state::AppState;
use crate::storage::portfolio_prefix;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioBody {
    pub user_id: String,
    #[serde(flatten)]
    pub fields: PortfolioFields,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/portfolios
pub async fn handle_create(
    State(state): State<AppState>,
    AppJson(body): AppJson<PortfolioBody>,
) -> Result<(StatusCode, Json<Portfolio>), AppError> {
    let owner = require_user(Some(body.user_id))?;
    let mut fields = body.fields;
    validate_fields(&mut fields)?;
    ensure_slug_free(&state, fields.slug.as_deref(), None).await?;

    let portfolio = Portfolio::new(owner, fields);
    state.store.insert(&portfolio).await?;
    info!(
        "Created portfolio {} for {} ({})",
        portfolio.id, portfolio.owner_id, portfolio.template_id
    );

    Ok((StatusCode::CREATED, Json(portfolio)))
}

/// GET /api/portfolios/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Portfolio>, AppError> {
    let id = parse_portfolio_id(Some(&id))?;
    Ok(Json(load_portfolio(&state, id).await?))
}

/// GET /api/portfolios?userId=
pub async fn handle_list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<OwnerQuery>,
) -> Result<Json<Vec<Portfolio>>, AppError> {
    let owner = require_user(query.user_id)?;
    Ok(Json(state.store.list_for_owner(&owner).await?))
}

/// PUT /api/portfolios/:id
///
/// Replaces the editable fields. `id`, owner and payment state never change here.
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<PortfolioBody>,
) -> Result<Json<Portfolio>, AppError> {
    let id = parse_portfolio_id(Some(&id))?;
    let mut portfolio = owned_portfolio(&state, id, Some(body.user_id)).await?;

    let mut fields = body.fields;
    validate_fields(&mut fields)?;
    ensure_slug_free(&state, fields.slug.as_deref(), Some(id)).await?;

    portfolio.apply_fields(fields);
    if !state.store.update(&portfolio).await? {
        return Err(AppError::NotFound(format!("Portfolio {id} not found")));
    }
    info!("Updated portfolio {id}");

    Ok(Json(portfolio))
}

/// DELETE /api/portfolios/:id?userId=
///
/// Removes the document, then best-effort its uploaded files and published output.
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppQuery(query): AppQuery<OwnerQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_portfolio_id(Some(&id))?;
    let portfolio = owned_portfolio(&state, id, query.user_id).await?;

    if !state.store.delete(id).await? {
        return Err(AppError::NotFound(format!("Portfolio {id} not found")));
    }

    let prefix = portfolio_prefix(&portfolio.owner_id, id);
    if let Err(e) = state.storage.delete_prefix(&prefix).await {
        warn!("Failed to delete stored assets under {prefix}: {e:#}");
    }

    let out_dir = state.config.portfolios_output_dir().join(id.to_string());
    match tokio::fs::remove_dir_all(&out_dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {e}", out_dir.display()),
    }

    info!("Deleted portfolio {id}");
    Ok(Json(DeleteResponse { success: true }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

pub fn require_user(user_id: Option<String>) -> Result<String, AppError> {
    user_id
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Validation("userId is required".to_string()))
}

/// Loads a portfolio and checks that `user_id` owns it.
pub async fn owned_portfolio(
    state: &AppState,
    id: Uuid,
    user_id: Option<String>,
) -> Result<Portfolio, AppError> {
    let user_id = require_user(user_id)?;
    let portfolio = load_portfolio(state, id).await?;
    if portfolio.owner_id != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(portfolio)
}

async fn ensure_slug_free(
    state: &AppState,
    slug: Option<&str>,
    current: Option<Uuid>,
) -> Result<(), AppError> {
    let Some(slug) = slug else {
        return Ok(());
    };
    match state.store.find_by_slug(slug).await? {
        Some(existing) if Some(existing.id) != current => Err(AppError::Conflict(format!(
            "slug '{slug}' is already taken"
        ))),
        _ => Ok(()),
    }
}
