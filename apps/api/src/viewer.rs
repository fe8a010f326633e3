//! Public viewer: `/p/:key`, where `key` is a portfolio id or slug.
//!
//! Paid portfolios are shown in a full-page frame over the published output;
//! unpaid ones get a 402 page linking to checkout.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::info;

use crate::errors::AppError;
use crate::generation::generator::generate_portfolio;
use crate::generation::publish::GenerationOutcome;
use crate::models::Portfolio;
use crate::payment::can_view;
use crate::state::AppState;
use crate::store::find_by_key;
use crate::templates::formatting::escape_html;
use crate::templates::INDEX_FILE;

pub async fn resolve(state: &AppState, key: &str) -> Result<Portfolio, AppError> {
    find_by_key(state.store.as_ref(), key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Portfolio '{key}' not found")))
}

/// GET /p/:key
pub async fn handle_view(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let portfolio = resolve(&state, &key).await?;

    if !can_view(portfolio.payment_status, state.config.bypass_payment) {
        info!("Portfolio {} viewed before payment", portfolio.id);
        return Ok((
            StatusCode::PAYMENT_REQUIRED,
            Html(payment_required_page(&portfolio, &key)),
        )
            .into_response());
    }

    let local_path = format!("/portfolios/{}/{INDEX_FILE}", portfolio.id);
    let published = state
        .config
        .portfolios_output_dir()
        .join(portfolio.id.to_string())
        .join(INDEX_FILE);

    if tokio::fs::try_exists(&published).await.unwrap_or(false) {
        return Ok(Html(frame_page(&portfolio, &local_path)).into_response());
    }

    info!("Portfolio {} has no published output, generating", portfolio.id);
    match generate_portfolio(&state.config, &portfolio).await? {
        GenerationOutcome::Published { .. } => {
            Ok(Html(frame_page(&portfolio, &local_path)).into_response())
        }
        GenerationOutcome::Inline { html_content } => Ok(Html(html_content).into_response()),
    }
}

fn page_title(portfolio: &Portfolio) -> String {
    match portfolio.name.trim() {
        "" => "Portfolio".to_string(),
        name => escape_html(name),
    }
}

fn frame_page(portfolio: &Portfolio, src: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>html,body{{margin:0;height:100%;overflow:hidden}}iframe{{border:0;width:100%;height:100%;display:block}}</style>
</head>
<body>
<iframe src="{src}" title="{title}"></iframe>
</body>
</html>
"#,
        title = page_title(portfolio),
        src = escape_html(src),
    )
}

fn payment_required_page(portfolio: &Portfolio, key: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta name="robots" content="noindex">
<title>{title} | Payment required</title>
<style>body{{font-family:system-ui,sans-serif;display:flex;align-items:center;justify-content:center;min-height:100vh;margin:0;background:#f5f5f7;color:#1d1d1f}}main{{text-align:center;max-width:28rem;padding:2rem}}a.pay{{display:inline-block;margin-top:1rem;padding:.75rem 1.5rem;border-radius:.5rem;background:#1d1d1f;color:#fff;text-decoration:none}}</style>
</head>
<body>
<main>
<h1>{title}</h1>
<p>This portfolio will be available once its one-time publishing fee has been paid.</p>
<a class="pay" href="/p/{key}/checkout">Complete payment</a>
</main>
</body>
</html>
"#,
        title = page_title(portfolio),
        key = escape_html(key),
    )
}
