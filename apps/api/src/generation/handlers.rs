//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::generation::generator::generate_portfolio;
use crate::generation::publish::GenerationOutcome;
use crate::models::Portfolio;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub portfolio_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: GenerationOutcome,
}

impl From<GenerationOutcome> for GenerateResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        GenerateResponse {
            success: true,
            outcome,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/portfolios/generate
///
/// Renders and publishes a stored portfolio. Answers with the public URL, or with
/// the HTML itself when the output directory could not be written.
pub async fn handle_generate(
    State(state): State<AppState>,
    AppJson(request): AppJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let id = parse_portfolio_id(request.portfolio_id.as_deref())?;
    let portfolio = load_portfolio(&state, id).await?;

    let outcome = generate_portfolio(&state.config, &portfolio).await?;

    Ok(Json(outcome.into()))
}

pub fn parse_portfolio_id(raw: Option<&str>) -> Result<Uuid, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Portfolio ID is required".to_string()))?;
    raw.parse()
        .map_err(|_| AppError::Validation(format!("Invalid portfolio ID '{raw}'")))
}

pub async fn load_portfolio(state: &AppState, id: Uuid) -> Result<Portfolio, AppError> {
    state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Portfolio {id} not found")))
}
