//! SEO artifacts: head meta tags, robots.txt and sitemap.xml.

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use crate::models::Portfolio;
use crate::templates::formatting::escape_html;

const DESCRIPTION_LIMIT: usize = 160;

/// Public URLs of one portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioUrls {
    /// Viewer page, keyed by slug when one exists.
    pub canonical: String,
    /// The published `index.html`.
    pub page: String,
    pub og_image: String,
    pub sitemap: String,
    pub output_base: String,
}

impl PortfolioUrls {
    pub fn new(site_base_url: &str, id: Uuid, slug: Option<&str>) -> Self {
        let base = site_base_url.trim_end_matches('/');
        let key = slug.map(str::to_string).unwrap_or_else(|| id.to_string());
        let output_base = format!("{base}/portfolios/{id}");
        PortfolioUrls {
            canonical: format!("{base}/p/{key}"),
            page: format!("{output_base}/index.html"),
            og_image: format!("{output_base}/og-image.png"),
            sitemap: format!("{output_base}/sitemap.xml"),
            output_base,
        }
    }

    pub fn for_portfolio(site_base_url: &str, portfolio: &Portfolio) -> Self {
        Self::new(site_base_url, portfolio.id, portfolio.slug.as_deref())
    }
}

/// Meta information injected into the `<head>` of a published portfolio.
#[derive(Debug, Clone)]
pub struct SeoMeta {
    pub title: String,
    pub description: String,
    pub name: String,
    pub job_title: String,
    pub email: String,
    pub same_as: Vec<String>,
    pub urls: PortfolioUrls,
}

impl SeoMeta {
    pub fn for_portfolio(portfolio: &Portfolio, site_base_url: &str) -> Self {
        let name = portfolio.name.trim().to_string();
        let job_title = portfolio.title.trim().to_string();
        let title = match (name.is_empty(), job_title.is_empty()) {
            (false, false) => format!("{name} | {job_title}"),
            (false, true) => name.clone(),
            (true, false) => job_title.clone(),
            (true, true) => "Portfolio".to_string(),
        };
        let description = if portfolio.about.trim().is_empty() {
            format!("Portfolio of {}", if name.is_empty() { "a professional" } else { name.as_str() })
        } else {
            truncate_description(&portfolio.about)
        };
        let same_as = [&portfolio.linkedin, &portfolio.github, &portfolio.website]
            .into_iter()
            .flatten()
            .map(|u| u.trim().to_string())
            .filter(|u| u.starts_with("http"))
            .collect();

        SeoMeta {
            title,
            description,
            name,
            job_title,
            email: portfolio.email.trim().to_string(),
            same_as,
            urls: PortfolioUrls::for_portfolio(site_base_url, portfolio),
        }
    }

    /// Meta, Open Graph, Twitter and JSON-LD tags for the document head.
    pub fn head_html(&self) -> String {
        let title = escape_html(&self.title);
        let description = escape_html(&self.description);
        let canonical = escape_html(&self.urls.canonical);
        let image = escape_html(&self.urls.og_image);

        let mut person = json!({
            "@context": "https://schema.org",
            "@type": "Person",
            "name": self.name,
            "url": self.urls.canonical,
            "image": self.urls.og_image,
        });
        if !self.job_title.is_empty() {
            person["jobTitle"] = json!(self.job_title);
        }
        if !self.email.is_empty() {
            person["email"] = json!(self.email);
        }
        if !self.same_as.is_empty() {
            person["sameAs"] = json!(self.same_as);
        }
        let json_ld = person.to_string().replace("</", "<\\/");

        [
            format!("<meta name=\"description\" content=\"{description}\">"),
            format!("<link rel=\"canonical\" href=\"{canonical}\">"),
            format!("<meta property=\"og:title\" content=\"{title}\">"),
            format!("<meta property=\"og:description\" content=\"{description}\">"),
            "<meta property=\"og:type\" content=\"profile\">".to_string(),
            format!("<meta property=\"og:url\" content=\"{canonical}\">"),
            format!("<meta property=\"og:image\" content=\"{image}\">"),
            "<meta property=\"og:image:width\" content=\"1200\">".to_string(),
            "<meta property=\"og:image:height\" content=\"630\">".to_string(),
            "<meta name=\"twitter:card\" content=\"summary_large_image\">".to_string(),
            format!("<meta name=\"twitter:title\" content=\"{title}\">"),
            format!("<meta name=\"twitter:description\" content=\"{description}\">"),
            format!("<meta name=\"twitter:image\" content=\"{image}\">"),
            format!("<script type=\"application/ld+json\">{json_ld}</script>"),
        ]
        .join("\n")
    }
}

/// Inserts `snippet` right before `</head>`. Documents without a head get it prepended.
/// Only the text before `<body` is searched, so inlined body scripts that spell
/// out `</head>` are never split.
pub fn inject_before_head_end(html: &str, snippet: &str) -> String {
    let head_len = body_start(html).unwrap_or(html.len());
    match inject_before_closing(&html[..head_len], "</head>", snippet) {
        Some(mut out) => {
            out.push_str(&html[head_len..]);
            out
        }
        None => format!("{snippet}{html}"),
    }
}

/// Inserts `snippet` right before the last `</body>`, or appends it.
pub fn inject_before_body_end(html: &str, snippet: &str) -> String {
    inject_before_closing(html, "</body>", snippet).unwrap_or_else(|| format!("{html}{snippet}"))
}

/// Byte offset of the opening `<body` tag, if any.
fn body_start(html: &str) -> Option<usize> {
    let lower = html.to_ascii_lowercase();
    lower.match_indices("<body").map(|(i, _)| i).find(|&i| {
        matches!(
            lower.as_bytes().get(i + 5),
            Some(b'>' | b' ' | b'\t' | b'\n' | b'\r' | b'/')
        )
    })
}

fn inject_before_closing(html: &str, closing: &str, snippet: &str) -> Option<String> {
    // ASCII lowercase keeps byte offsets identical to the original.
    let pos = html.to_ascii_lowercase().rfind(closing)?;
    let mut out = String::with_capacity(html.len() + snippet.len());
    out.push_str(&html[..pos]);
    out.push_str(snippet);
    out.push_str(&html[pos..]);
    Some(out)
}

fn truncate_description(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= DESCRIPTION_LIMIT {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(DESCRIPTION_LIMIT - 3).collect();
    format!("{}...", cut.trim_end())
}

pub fn robots_txt(urls: &PortfolioUrls) -> String {
    format!("User-agent: *\nAllow: /\n\nSitemap: {}\n", urls.sitemap)
}

pub fn sitemap_xml(urls: &PortfolioUrls, lastmod: NaiveDate) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>{}</loc>
    <lastmod>{}</lastmod>
    <changefreq>monthly</changefreq>
    <priority>1.0</priority>
  </url>
</urlset>
"#,
        escape_html(&urls.canonical),
        lastmod.format("%Y-%m-%d")
    )
}
