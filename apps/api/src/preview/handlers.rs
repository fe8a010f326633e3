//! Axum route handlers for template previews and the template catalogue.

use axum::{
    extract::State,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::AppQuery;
use crate::generation::render::{render_portfolio_html, RenderOptions};
use crate::preview::{sample_portfolio, EDITOR_BRIDGE_SCRIPT};
use crate::state::AppState;
use crate::templates::{TemplateFiles, TemplateId};

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub template: Option<String>,
    #[serde(default)]
    pub editable: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: TemplateId,
    pub name: &'static str,
    pub preview_url: String,
}

/// GET /api/preview-template?template=&editable=
///
/// Renders a template with sample data. Editable previews carry the editor bridge.
pub async fn handle_preview(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PreviewQuery>,
) -> Result<Html<String>, AppError> {
    let raw = query
        .template
        .ok_or_else(|| AppError::Validation("template is required".to_string()))?;
    let template_id: TemplateId = raw.parse().map_err(AppError::Validation)?;

    let files = TemplateFiles::load(&state.config.templates_dir, template_id).await?;
    let options = RenderOptions {
        seo: None,
        body_snippet: query.editable.then(|| EDITOR_BRIDGE_SCRIPT.to_string()),
        minify: true,
    };

    Ok(Html(render_portfolio_html(
        &files,
        &sample_portfolio(template_id),
        &options,
    )))
}

/// GET /api/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateSummary>> {
    Json(
        TemplateId::ALL
            .into_iter()
            .map(|id| TemplateSummary {
                id,
                name: id.display_name(),
                preview_url: format!("/api/preview-template?template={id}"),
            })
            .collect(),
    )
}
