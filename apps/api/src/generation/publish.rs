//! Writes generated output under `{public_dir}/portfolios/{id}/`.
//!
//! Only the directory and `index.html` are load-bearing: if either fails the caller
//! falls back to returning the HTML inline. Everything else here (asset copies,
//! robots.txt, sitemap.xml, og-image.png) is best-effort, logged and swallowed.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::generation::og_image::{og_svg, render_png, site_label};
use crate::generation::seo::{robots_txt, sitemap_xml, PortfolioUrls};
use crate::models::Portfolio;
use crate::templates::INDEX_FILE;

/// Template subdirectories copied next to the published page.
const ASSET_DIRS: &[&str] = &["css", "js", "img"];

/// Result of a generation call: either a public URL or the HTML itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GenerationOutcome {
    Published {
        url: String,
    },
    Inline {
        #[serde(rename = "htmlContent")]
        html_content: String,
    },
}

/// Creates the output directory (recursively, idempotent) and writes `index.html`.
pub async fn write_index(out_dir: &Path, html: &str) -> io::Result<()> {
    tokio::fs::create_dir_all(out_dir).await?;
    tokio::fs::write(out_dir.join(INDEX_FILE), html).await
}

/// Copies `css/`, `js/`, `img/` and any other top-level file except `index.html`.
/// Each directory is copied independently; a missing one is skipped.
pub async fn copy_template_assets(template_dir: &Path, out_dir: &Path) {
    for name in ASSET_DIRS {
        let src = template_dir.join(name);
        match tokio::fs::try_exists(&src).await {
            Ok(true) => {
                if let Err(e) = copy_dir_recursive(&src, &out_dir.join(name)).await {
                    warn!("Failed to copy {}: {e}", src.display());
                }
            }
            Ok(false) => debug!("Template has no {name}/ directory"),
            Err(e) => warn!("Cannot stat {}: {e}", src.display()),
        }
    }

    if let Err(e) = copy_top_level_files(template_dir, out_dir).await {
        warn!("Failed to copy top-level files from {}: {e}", template_dir.display());
    }
}

async fn copy_top_level_files(template_dir: &Path, out_dir: &Path) -> io::Result<()> {
    let mut entries = tokio::fs::read_dir(template_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        if file_name == INDEX_FILE || !entry.file_type().await?.is_file() {
            continue;
        }
        if let Err(e) = tokio::fs::copy(entry.path(), out_dir.join(&file_name)).await {
            warn!("Failed to copy {}: {e}", entry.path().display());
        }
    }
    Ok(())
}

async fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(src.to_path_buf(), dst.to_path_buf())];
    while let Some((from, to)) = pending.pop() {
        tokio::fs::create_dir_all(&to).await?;
        let mut entries = tokio::fs::read_dir(&from).await?;
        while let Some(entry) = entries.next_entry().await? {
            let target = to.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                pending.push((entry.path(), target));
            } else {
                tokio::fs::copy(entry.path(), target).await?;
            }
        }
    }
    Ok(())
}

/// Writes `robots.txt` and `sitemap.xml`. The sitemap's `lastmod` is today's date.
pub async fn write_seo_files(out_dir: &Path, urls: &PortfolioUrls) {
    let lastmod = Utc::now().date_naive();
    let files = [
        ("robots.txt", robots_txt(urls)),
        ("sitemap.xml", sitemap_xml(urls, lastmod)),
    ];
    for (name, content) in files {
        if let Err(e) = tokio::fs::write(out_dir.join(name), content).await {
            warn!("Failed to write {name} in {}: {e}", out_dir.display());
        }
    }
}

/// Renders and writes `og-image.png`. Never fails the caller.
pub async fn write_og_image(out_dir: &Path, portfolio: &Portfolio, urls: &PortfolioUrls) {
    let svg = og_svg(&portfolio.name, &portfolio.title, &site_label(&urls.canonical));
    let png = match tokio::task::spawn_blocking(move || render_png(&svg)).await {
        Ok(Ok(png)) => png,
        Ok(Err(e)) => {
            warn!("OG image generation failed for {}: {e:#}", portfolio.id);
            return;
        }
        Err(e) => {
            warn!("OG image task panicked for {}: {e}", portfolio.id);
            return;
        }
    };
    if let Err(e) = tokio::fs::write(out_dir.join("og-image.png"), png).await {
        warn!("Failed to write og-image.png for {}: {e}", portfolio.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::test_files::write_template;
    use crate::templates::TemplateId;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_write_index_creates_nested_dirs_and_overwrites() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("portfolios").join("abc");
        write_index(&out, "<p>one</p>").await.unwrap();
        write_index(&out, "<p>two</p>").await.unwrap();
        assert_eq!(std::fs::read_to_string(out.join("index.html")).unwrap(), "<p>two</p>");
    }

    #[tokio::test]
    async fn test_write_index_fails_when_parent_is_a_file() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("public");
        std::fs::write(&blocker, "not a directory").unwrap();
        assert!(write_index(&blocker.join("portfolios/x"), "<p></p>").await.is_err());
    }

    #[tokio::test]
    async fn test_copy_assets_copies_dirs_and_top_level_files() {
        let templates = tempfile::tempdir().unwrap();
        write_template(templates.path(), TemplateId::Template1);
        let out = tempfile::tempdir().unwrap();

        copy_template_assets(&TemplateId::Template1.dir(templates.path()), out.path()).await;

        assert!(out.path().join("css/styles.css").exists());
        assert!(out.path().join("js/script.js").exists());
        assert!(out.path().join("img/pattern.svg").exists());
        assert!(out.path().join("favicon.ico").exists());
        assert!(!out.path().join("index.html").exists());
    }

    #[tokio::test]
    async fn test_missing_img_dir_is_not_an_error() {
        let templates = tempfile::tempdir().unwrap();
        write_template(templates.path(), TemplateId::Template2);
        let dir = TemplateId::Template2.dir(templates.path());
        std::fs::remove_dir_all(dir.join("img")).unwrap();
        let out = tempfile::tempdir().unwrap();

        copy_template_assets(&dir, out.path()).await;

        assert!(out.path().join("css/styles.css").exists());
        assert!(!out.path().join("img").exists());
    }

    #[tokio::test]
    async fn test_seo_files_written() {
        let out = tempfile::tempdir().unwrap();
        let urls = PortfolioUrls::new("https://folio.dev", Uuid::new_v4(), Some("ada"));
        write_seo_files(out.path(), &urls).await;

        let robots = std::fs::read_to_string(out.path().join("robots.txt")).unwrap();
        assert!(robots.contains("Sitemap:"));
        let sitemap = std::fs::read_to_string(out.path().join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("https://folio.dev/p/ada"));
    }

    #[tokio::test]
    async fn test_og_image_failure_is_swallowed() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("does-not-exist");
        let portfolio = Portfolio::new("u", Default::default());
        let urls = PortfolioUrls::for_portfolio("https://folio.dev", &portfolio);
        write_og_image(&missing, &portfolio, &urls).await;
        assert!(!missing.join("og-image.png").exists());
    }

    #[test]
    fn test_outcome_serializes_to_url_or_html_content() {
        let published = serde_json::to_value(GenerationOutcome::Published {
            url: "https://x/index.html".to_string(),
        })
        .unwrap();
        assert_eq!(published, serde_json::json!({ "url": "https://x/index.html" }));

        let inline = serde_json::to_value(GenerationOutcome::Inline {
            html_content: "<p></p>".to_string(),
        })
        .unwrap();
        assert_eq!(inline, serde_json::json!({ "htmlContent": "<p></p>" }));
    }
}
