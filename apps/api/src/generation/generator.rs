//! Portfolio generation: orchestrates the full pipeline for one stored portfolio.
//!
//! Flow: load template files → substitute → inline assets → SEO tags → minify →
//!       write `index.html` → copy assets → robots/sitemap → OG image.
//!
//! Only template loading can fail the call. A failed write downgrades the
//! outcome to inline HTML so the caller can still show the page.

use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::generation::publish::{
    copy_template_assets, write_index, write_og_image, write_seo_files, GenerationOutcome,
};
use crate::generation::render::{render_portfolio_html, RenderOptions};
use crate::generation::seo::PortfolioUrls;
use crate::models::Portfolio;
use crate::templates::TemplateFiles;

/// Renders `portfolio` with its template and publishes it under
/// `{public_dir}/portfolios/{id}/`. Regeneration overwrites earlier output.
pub async fn generate_portfolio(
    config: &Config,
    portfolio: &Portfolio,
) -> Result<GenerationOutcome, AppError> {
    info!(
        "Generating portfolio {} with {}",
        portfolio.id, portfolio.template_id
    );

    let files = TemplateFiles::load(&config.templates_dir, portfolio.template_id).await?;
    let options = RenderOptions::published(portfolio, &config.site_base_url);
    let html = render_portfolio_html(&files, portfolio, &options);

    let out_dir = config.portfolios_output_dir().join(portfolio.id.to_string());
    if let Err(e) = write_index(&out_dir, &html).await {
        warn!(
            "Cannot write {} ({e}); returning portfolio {} inline",
            out_dir.display(),
            portfolio.id
        );
        return Ok(GenerationOutcome::Inline { html_content: html });
    }

    let urls = PortfolioUrls::for_portfolio(&config.site_base_url, portfolio);
    copy_template_assets(&files.dir, &out_dir).await;
    write_seo_files(&out_dir, &urls).await;
    write_og_image(&out_dir, portfolio, &urls).await;

    info!("Portfolio {} published at {}", portfolio.id, urls.page);
    Ok(GenerationOutcome::Published { url: urls.page })
}
