//! Multipart asset uploads: profile picture, CV and per-project images.
//!
//! Files upload concurrently. A failed upload never fails the request: the
//! previous URL is kept (projects fall back to a placeholder image) and the
//! failure is reported in a `warning` string.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::handlers::parse_portfolio_id;
use crate::models::Portfolio;
use crate::portfolios::handlers::owned_portfolio;
use crate::state::AppState;
use crate::storage::{asset_key, AssetSlot};
use crate::templates::fragments::DEFAULT_PROJECT_IMAGE;

/// One file part of the form.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub slot: AssetSlot,
    pub filename: String,
    pub content_type: String,
    pub body: Bytes,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub portfolio: Portfolio,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Maps a form field name to its slot: `profilePicture`, `cv`, `project_{i}`.
pub fn slot_for_field(name: &str) -> Option<AssetSlot> {
    match name {
        "profilePicture" => Some(AssetSlot::ProfilePicture),
        "cv" => Some(AssetSlot::Cv),
        other => other
            .strip_prefix("project_")
            .and_then(|i| i.parse().ok())
            .map(AssetSlot::Project),
    }
}

/// POST /api/portfolios/:id/assets
pub async fn handle_upload_assets(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let id = parse_portfolio_id(Some(&id))?;

    let mut user_id: Option<String> = None;
    let mut pending: Vec<PendingUpload> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "userId" {
            user_id = Some(
                field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable userId: {e}")))?,
            );
            continue;
        }

        let Some(slot) = slot_for_field(&name) else {
            warn!("Ignoring unknown upload field '{name}'");
            continue;
        };
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Unreadable file '{name}': {e}")))?;
        if body.is_empty() {
            continue;
        }
        pending.push(PendingUpload {
            slot,
            filename,
            content_type,
            body,
        });
    }

    let mut portfolio = owned_portfolio(&state, id, user_id).await?;
    let warning = upload_all(&state, &mut portfolio, pending).await;

    if !state.store.update(&portfolio).await? {
        return Err(AppError::NotFound(format!("Portfolio {id} not found")));
    }

    Ok(Json(UploadResponse {
        success: true,
        portfolio,
        warning,
    }))
}

/// Uploads every file concurrently and writes the resulting URLs into
/// `portfolio`. Returns a warning listing what failed, if anything.
pub async fn upload_all(
    state: &AppState,
    portfolio: &mut Portfolio,
    pending: Vec<PendingUpload>,
) -> Option<String> {
    let mut failed: Vec<String> = Vec::new();

    let (valid, out_of_range): (Vec<_>, Vec<_>) = pending.into_iter().partition(|u| match u.slot {
        AssetSlot::Project(i) => i < portfolio.projects.len(),
        _ => true,
    });
    for upload in out_of_range {
        warn!(
            "Portfolio {} has no {}; skipping upload",
            portfolio.id,
            upload.slot.label()
        );
        failed.push(upload.slot.label());
    }

    let owner_id = portfolio.owner_id.clone();
    let portfolio_id = portfolio.id;
    let upload_futures: Vec<_> = valid
        .into_iter()
        .map(|upload| {
            let key = asset_key(&owner_id, portfolio_id, upload.slot, &upload.filename);
            let storage = state.storage.clone();
            async move {
                let result = storage
                    .put(&key, upload.body, &upload.content_type)
                    .await;
                (upload.slot, result)
            }
        })
        .collect();

    for (slot, result) in join_all(upload_futures).await {
        match result {
            Ok(url) => {
                info!("Uploaded {} for portfolio {portfolio_id}", slot.label());
                set_url(portfolio, slot, url);
            }
            Err(e) => {
                warn!(
                    "Upload of {} for portfolio {portfolio_id} failed: {e:#}",
                    slot.label()
                );
                if let AssetSlot::Project(i) = slot {
                    let image = &mut portfolio.projects[i].image_url;
                    if image.as_deref().map_or(true, |u| u.trim().is_empty()) {
                        *image = Some(DEFAULT_PROJECT_IMAGE.to_string());
                    }
                }
                failed.push(slot.label());
            }
        }
    }

    if failed.is_empty() {
        None
    } else {
        Some(format!(
            "Some files could not be uploaded and were left unchanged: {}",
            failed.join(", ")
        ))
    }
}

fn set_url(portfolio: &mut Portfolio, slot: AssetSlot, url: String) {
    match slot {
        AssetSlot::ProfilePicture => portfolio.profile_picture_url = Some(url),
        AssetSlot::Cv => portfolio.cv_url = Some(url),
        AssetSlot::Project(i) => {
            if let Some(project) = portfolio.projects.get_mut(i) {
                project.image_url = Some(url);
            }
        }
    }
}
