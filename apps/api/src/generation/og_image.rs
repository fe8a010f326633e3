//! Open Graph preview image: an SVG card rasterized to PNG.
//! Rasterization is CPU-bound and must run inside `tokio::task::spawn_blocking`.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{fontdb, Options, Tree};

use crate::templates::formatting::escape_html;

pub const OG_WIDTH: u32 = 1200;
pub const OG_HEIGHT: u32 = 630;

lazy_static! {
    static ref FONTS: Arc<fontdb::Database> = {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    };
}

/// Builds the 1200×630 card showing name, title and the site host.
pub fn og_svg(title: &str, subtitle: &str, site: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
  <defs>
    <linearGradient id="bg" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0%" stop-color="#0f172a"/>
      <stop offset="100%" stop-color="#1e3a8a"/>
    </linearGradient>
  </defs>
  <rect width="{w}" height="{h}" fill="url(#bg)"/>
  <rect x="80" y="250" width="120" height="8" rx="4" fill="#38bdf8"/>
  <text x="80" y="220" font-family="Inter, Helvetica, Arial, sans-serif" font-size="72" font-weight="700" fill="#f8fafc">{title}</text>
  <text x="80" y="330" font-family="Inter, Helvetica, Arial, sans-serif" font-size="40" fill="#cbd5e1">{subtitle}</text>
  <text x="80" y="560" font-family="Inter, Helvetica, Arial, sans-serif" font-size="28" fill="#94a3b8">{site}</text>
</svg>"##,
        w = OG_WIDTH,
        h = OG_HEIGHT,
        title = escape_html(&clip(title, 32)),
        subtitle = escape_html(&clip(subtitle, 56)),
        site = escape_html(&clip(site, 64)),
    )
}

/// Rasterizes an SVG document to PNG bytes.
pub fn render_png(svg: &str) -> Result<Vec<u8>> {
    let mut options = Options::default();
    options.fontdb = FONTS.clone();

    let tree = Tree::from_str(svg, &options).map_err(|e| anyhow!("invalid SVG: {e}"))?;
    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow!("cannot allocate {}x{} pixmap", size.width(), size.height()))?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| anyhow!("PNG encoding failed: {e}"))
}

/// Host part of a URL, e.g. `https://folio.dev/p/ada` → `folio.dev`.
pub fn site_label(url: &str) -> String {
    url.split("://")
        .nth(1)
        .unwrap_or(url)
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn clip(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars - 1).collect();
    format!("{}…", cut.trim_end())
}
