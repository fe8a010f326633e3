//! Inlines the template's stylesheet and script into the generated document.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::templates::{SCRIPT_FILE, STYLESHEET_FILE};

lazy_static! {
    static ref STYLESHEET_LINK: Regex =
        Regex::new(r#"(?i)<link\b[^>]*\brel\s*=\s*["']?stylesheet["']?[^>]*>"#).expect("valid regex");
    static ref SCRIPT_TAG: Regex =
        Regex::new(r#"(?is)<script\b[^>]*\bsrc\s*=\s*["']([^"']+)["'][^>]*>\s*</script>"#)
            .expect("valid regex");
    static ref HREF: Regex =
        Regex::new(r#"(?i)\bhref\s*=\s*["']([^"']+)["']"#).expect("valid regex");
}

/// Replaces the `<link>` to the template stylesheet with a `<style>` block and the
/// `<script src>` for the template script with an inline `<script>`.
/// References to other files are left alone.
pub fn inline_assets(html: &str, css: &str, js: &str) -> String {
    let with_css = STYLESHEET_LINK.replace_all(html, |caps: &Captures| {
        let tag = &caps[0];
        match HREF.captures(tag) {
            Some(href) if is_local_path(&href[1], STYLESHEET_FILE) => {
                format!("<style>{css}</style>")
            }
            _ => tag.to_string(),
        }
    });

    SCRIPT_TAG
        .replace_all(&with_css, |caps: &Captures| {
            if is_local_path(&caps[1], SCRIPT_FILE) {
                format!("<script>{}</script>", escape_script(js))
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// True when `reference` points at `expected` relative to the template root,
/// e.g. `./css/styles.css` or `css/styles.css?v=2`.
fn is_local_path(reference: &str, expected: &str) -> bool {
    let path = reference
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_start_matches("./")
        .trim_start_matches('/');
    path == expected
}

/// Keeps an inlined script from closing its own element early.
fn escape_script(js: &str) -> String {
    js.replace("</script", "<\\/script")
}
