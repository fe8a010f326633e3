//! Axum route handlers for the live editor.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::editor::{apply, EditorMessage};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::generation::generator::generate_portfolio;
use crate::generation::handlers::parse_portfolio_id;
use crate::generation::publish::GenerationOutcome;
use crate::models::Portfolio;
use crate::portfolios::handlers::owned_portfolio;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorRequest {
    pub user_id: Option<String>,
    pub message: EditorMessage,
}

#[derive(Debug, Serialize)]
pub struct EditorResponse {
    pub success: bool,
    /// Absent for `requestInitialData`, which does not regenerate.
    #[serde(flatten)]
    pub outcome: Option<GenerationOutcome>,
    pub portfolio: Portfolio,
}

/// POST /api/editor/:id
///
/// Applies one editor message to the owner's portfolio, saves it and republishes.
pub async fn handle_editor_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<EditorRequest>,
) -> Result<Json<EditorResponse>, AppError> {
    let id = parse_portfolio_id(Some(&id))?;
    let mut portfolio = owned_portfolio(&state, id, request.user_id).await?;

    if !request.message.mutates() {
        return Ok(Json(EditorResponse {
            success: true,
            outcome: None,
            portfolio,
        }));
    }

    apply(&mut portfolio, &request.message).map_err(|e| AppError::Validation(e.to_string()))?;
    if !state.store.update(&portfolio).await? {
        return Err(AppError::NotFound(format!("Portfolio {id} not found")));
    }
    info!("Applied editor change to portfolio {id}");

    let outcome = generate_portfolio(&state.config, &portfolio).await?;
    Ok(Json(EditorResponse {
        success: true,
        outcome: Some(outcome),
        portfolio,
    }))
}
