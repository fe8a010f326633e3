//! Axum route handlers for checkout and payment confirmation.

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::generation::handlers::parse_portfolio_id;
use crate::generation::seo::PortfolioUrls;
use crate::models::{PaymentStatus, Portfolio};
use crate::payment::CheckoutRequest;
use crate::portfolios::handlers::owned_portfolio;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub url: String,
    pub already_paid: bool,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub session_id: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/portfolios/:id/checkout
///
/// Opens a one-time checkout for the owner's portfolio. An already paid
/// portfolio gets its viewer URL back instead.
pub async fn handle_checkout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<CheckoutBody>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let id = parse_portfolio_id(Some(&id))?;
    let portfolio = owned_portfolio(&state, id, body.user_id).await?;

    let urls = PortfolioUrls::for_portfolio(&state.config.site_base_url, &portfolio);
    if portfolio.is_paid() {
        return Ok(Json(CheckoutResponse {
            url: urls.canonical,
            already_paid: true,
        }));
    }

    let url = open_checkout(&state, &portfolio).await?;
    Ok(Json(CheckoutResponse {
        url,
        already_paid: false,
    }))
}

/// GET /p/:key/checkout
///
/// Link target on the payment-required page: redirects straight to checkout.
pub async fn handle_viewer_checkout(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Redirect, AppError> {
    let portfolio = crate::viewer::resolve(&state, &key).await?;
    if portfolio.is_paid() {
        return Ok(Redirect::to(&format!("/p/{key}")));
    }
    let url = open_checkout(&state, &portfolio).await?;
    Ok(Redirect::to(&url))
}

/// GET /api/payments/confirm?session_id=
///
/// Return URL of a completed checkout: verifies the session with the provider,
/// marks the portfolio paid and redirects to its viewer page.
pub async fn handle_confirm(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ConfirmQuery>,
) -> Result<Redirect, AppError> {
    let session_id = query
        .session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("session_id is required".to_string()))?;

    let paid = state
        .payments
        .paid_portfolio(&session_id)
        .await
        .map_err(|e| AppError::Payment(format!("{e:#}")))?;

    let Some(portfolio_id) = paid else {
        warn!("Checkout session {session_id} returned without payment");
        return Err(AppError::Validation(
            "Payment has not been completed".to_string(),
        ));
    };

    if !state
        .store
        .set_payment_status(portfolio_id, PaymentStatus::Paid)
        .await?
    {
        return Err(AppError::NotFound(format!(
            "Portfolio {portfolio_id} not found"
        )));
    }

    info!("Portfolio {portfolio_id} marked paid (session {session_id})");
    Ok(Redirect::to(&format!("/p/{portfolio_id}")))
}

async fn open_checkout(state: &AppState, portfolio: &Portfolio) -> Result<String, AppError> {
    let base = &state.config.site_base_url;
    let urls = PortfolioUrls::for_portfolio(base, portfolio);
    let request = CheckoutRequest {
        portfolio_id: portfolio.id,
        owner_id: portfolio.owner_id.clone(),
        customer_email: Some(portfolio.email.clone()),
        success_url: format!("{base}/api/payments/confirm?session_id={{CHECKOUT_SESSION_ID}}"),
        cancel_url: urls.canonical,
    };

    state
        .payments
        .create_checkout(&request)
        .await
        .map_err(|e| AppError::Payment(format!("{e:#}")))
}
