//! Whitespace and comment minification for generated documents.
//!
//! Markup outside raw elements has comments stripped and whitespace runs
//! collapsed to one space. `<style>` and `<script>` bodies get their own
//! minifiers; `<pre>` and `<textarea>` are copied verbatim.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref RAW_ELEMENT: Regex = Regex::new(
        r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<pre\b[^>]*>.*?</pre\s*>|<textarea\b[^>]*>.*?</textarea\s*>"
    )
    .expect("valid regex");
    static ref HTML_COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").expect("valid regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
    static ref BLOCK_COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").expect("valid regex");
    static ref CSS_PUNCTUATION: Regex = Regex::new(r"\s*([{};,>])\s*").expect("valid regex");
    static ref CSS_COLON: Regex = Regex::new(r"\s*:\s*").expect("valid regex");
    static ref DECLARATION_BLOCK: Regex = Regex::new(r"\{[^{}]*\}").expect("valid regex");
}

pub fn minify_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for element in RAW_ELEMENT.find_iter(html) {
        out.push_str(&minify_markup(&html[last..element.start()]));
        out.push_str(&minify_raw_element(element.as_str()));
        last = element.end();
    }
    out.push_str(&minify_markup(&html[last..]));
    out.trim().to_string()
}

fn minify_markup(markup: &str) -> String {
    let without_comments = HTML_COMMENT.replace_all(markup, "");
    WHITESPACE.replace_all(&without_comments, " ").into_owned()
}

fn minify_raw_element(element: &str) -> String {
    let (Some(open_end), Some(close_start)) = (element.find('>'), element.rfind("</")) else {
        return element.to_string();
    };
    let open_tag = &element[..=open_end];
    let body = &element[open_end + 1..close_start];
    let close_tag = &element[close_start..];
    let lower = open_tag.to_ascii_lowercase();

    let minified = if lower.starts_with("<style") {
        minify_css(body)
    } else if lower.starts_with("<script") {
        if lower.contains("application/ld+json") {
            body.trim().to_string()
        } else {
            minify_js(body)
        }
    } else {
        return element.to_string();
    };

    format!(
        "{}{}{}",
        WHITESPACE.replace_all(open_tag, " "),
        minified,
        close_tag
    )
}

pub fn minify_css(css: &str) -> String {
    let without_comments = BLOCK_COMMENT.replace_all(css, "");
    let collapsed = WHITESPACE.replace_all(&without_comments, " ");
    let tight = CSS_PUNCTUATION.replace_all(&collapsed, "$1");
    // Only inside declarations: in a selector, `a :hover` differs from `a:hover`.
    let tight = DECLARATION_BLOCK.replace_all(&tight, |caps: &Captures| {
        CSS_COLON.replace_all(&caps[0], ":").into_owned()
    });
    tight.replace(";}", "}").trim().to_string()
}

/// Conservative JS minifier: drops block comments and whole-line `//` comments,
/// trims every line and removes blank ones. Newlines are kept so automatic
/// semicolon insertion behaves as in the source.
pub fn minify_js(js: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(js, "");
    without_blocks
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}
