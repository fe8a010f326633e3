//! Placeholder substitution for template HTML.
//!
//! Three constructs are understood, resolved in this order:
//! 1. `{{#each list}}…{{/each}}`: replaced by the fragment for `(template, list)`.
//! 2. `{{#if field}}…{{else}}…{{/if}}`: keeps the branch matching the field's
//!    truthiness. Nested blocks resolve depth-first.
//! 3. `{{field}}`: single-pass replacement; unknown fields become `""`.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::models::Portfolio;
use crate::templates::formatting::{escape_html, format_text};
use crate::templates::fragments::{build_fragment, safe_url, ListKind};
use crate::templates::TemplateId;

lazy_static! {
    static ref EACH_BLOCK: Regex =
        Regex::new(r"(?s)\{\{#each\s+(\w+)\s*\}\}.*?\{\{/each\}\}").expect("valid regex");
    static ref BLOCK_TAG: Regex =
        Regex::new(r"\{\{\s*(?:#if\s+([\w.]+)|(else)|(/if))\s*\}\}").expect("valid regex");
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{\s*(/if|/each|[A-Za-z_][\w.]*)\s*\}\}").expect("valid regex");
}

/// Values visible to a template: rendered scalar text plus truthiness per field.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    scalars: HashMap<String, String>,
    truthy: HashMap<String, bool>,
}

impl RenderContext {
    /// Builds the context for `portfolio` rendered with `template`.
    /// Scalar values are escaped HTML; template3 gets code-line formatting for `about`.
    pub fn for_portfolio(portfolio: &Portfolio, template: TemplateId) -> Self {
        let mut ctx = RenderContext::default();
        let code = template.uses_code_formatting();

        ctx.insert_text("name", &portfolio.name);
        ctx.insert_text("title", &portfolio.title);
        ctx.insert("about", format_text(&portfolio.about, code), is_set(&portfolio.about));
        ctx.insert_text("email", &portfolio.email);
        ctx.insert_text("phone", &portfolio.phone);
        ctx.insert_text("location", &portfolio.location);
        ctx.insert_url("linkedin", portfolio.linkedin.as_deref());
        ctx.insert_url("github", portfolio.github.as_deref());
        ctx.insert_url("website", portfolio.website.as_deref());
        ctx.insert_url("profilePictureUrl", portfolio.profile_picture_url.as_deref());
        ctx.insert_url("cvUrl", portfolio.cv_url.as_deref());
        ctx.insert("initials", escape_html(&portfolio.initials()), true);

        ctx.set_flag("hasCv", portfolio.has_cv());
        for (key, flag, present) in [
            ("skills", "hasSkills", !portfolio.skills.is_empty()),
            ("experience", "hasExperience", !portfolio.experience.is_empty()),
            ("education", "hasEducation", !portfolio.education.is_empty()),
            ("projects", "hasProjects", !portfolio.projects.is_empty()),
        ] {
            ctx.set_flag(key, present);
            ctx.set_flag(flag, present);
        }
        ctx
    }

    /// Inserts an already-rendered value.
    pub fn insert(&mut self, key: impl Into<String>, html: String, truthy: bool) {
        let key = key.into();
        self.truthy.insert(key.clone(), truthy);
        self.scalars.insert(key, html);
    }

    /// Inserts plain text, escaped.
    pub fn insert_text(&mut self, key: &str, text: &str) {
        self.insert(key, escape_html(text), is_set(text));
    }

    fn insert_url(&mut self, key: &str, url: Option<&str>) {
        let url = url.unwrap_or_default();
        let rendered = if is_set(url) { safe_url(url) } else { String::new() };
        self.insert(key, rendered, is_set(url));
    }

    pub fn set_flag(&mut self, key: &str, value: bool) {
        self.truthy.insert(key.to_string(), value);
    }

    pub fn is_truthy(&self, field: &str) -> bool {
        self.truthy.get(field).copied().unwrap_or(false)
    }

    pub fn value(&self, field: &str) -> &str {
        self.scalars.get(field).map(String::as_str).unwrap_or("")
    }
}

fn is_set(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Runs all three substitution passes over `html`.
pub fn render_template(
    html: &str,
    template: TemplateId,
    portfolio: &Portfolio,
    ctx: &RenderContext,
) -> String {
    let expanded = expand_each_blocks(html, template, portfolio);
    let resolved = resolve_conditionals(&expanded, ctx);
    substitute_scalars(&resolved, ctx)
}

/// Replaces every `{{#each list}}…{{/each}}` with the list's fragment.
pub fn expand_each_blocks(html: &str, template: TemplateId, portfolio: &Portfolio) -> String {
    EACH_BLOCK
        .replace_all(html, |caps: &Captures| match caps[1].parse::<ListKind>() {
            Ok(list) => build_fragment(template, list, portfolio),
            Err(_) => String::new(),
        })
        .into_owned()
}

/// Replaces `{{field}}` placeholders in a single pass. Control tags left over
/// from conditional resolution (`{{else}}`, `{{/if}}`) match no field and vanish.
pub fn substitute_scalars(html: &str, ctx: &RenderContext) -> String {
    PLACEHOLDER
        .replace_all(html, |caps: &Captures| ctx.value(&caps[1]).to_string())
        .into_owned()
}

#[derive(Debug, Clone, Copy)]
enum TagKind<'a> {
    If(&'a str),
    Else,
    EndIf,
}

#[derive(Debug, Clone, Copy)]
struct Tag<'a> {
    start: usize,
    end: usize,
    kind: TagKind<'a>,
}

/// Resolves `{{#if}}` blocks. Unterminated or stray tags are left untouched.
pub fn resolve_conditionals(html: &str, ctx: &RenderContext) -> String {
    let tags: Vec<Tag<'_>> = BLOCK_TAG
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let kind = match (caps.get(1), caps.get(2)) {
                (Some(field), _) => TagKind::If(field.as_str()),
                (None, Some(_)) => TagKind::Else,
                (None, None) => TagKind::EndIf,
            };
            Some(Tag {
                start: whole.start(),
                end: whole.end(),
                kind,
            })
        })
        .collect();

    render_range(html, 0, html.len(), &tags, ctx)
}

fn render_range(html: &str, start: usize, end: usize, tags: &[Tag<'_>], ctx: &RenderContext) -> String {
    let mut out = String::with_capacity(end - start);
    let mut cursor = start;
    let mut i = 0;

    while i < tags.len() {
        let TagKind::If(field) = tags[i].kind else {
            i += 1;
            continue;
        };
        let Some((else_idx, end_idx)) = find_matching(tags, i) else {
            i += 1;
            continue;
        };

        out.push_str(&html[cursor..tags[i].start]);

        let branch = if ctx.is_truthy(field) {
            let stop = else_idx.unwrap_or(end_idx);
            Some((tags[i].end, tags[stop].start, &tags[i + 1..stop]))
        } else {
            else_idx.map(|e| (tags[e].end, tags[end_idx].start, &tags[e + 1..end_idx]))
        };
        if let Some((body_start, body_end, body_tags)) = branch {
            out.push_str(&render_range(html, body_start, body_end, body_tags, ctx));
        }

        cursor = tags[end_idx].end;
        i = end_idx + 1;
    }

    out.push_str(&html[cursor..end]);
    out
}

/// Finds the `{{else}}` (if any) and `{{/if}}` closing the `{{#if}}` at `open`.
fn find_matching(tags: &[Tag<'_>], open: usize) -> Option<(Option<usize>, usize)> {
    let mut depth = 0usize;
    let mut else_idx = None;
    for (j, tag) in tags.iter().enumerate().skip(open + 1) {
        match tag.kind {
            TagKind::If(_) => depth += 1,
            TagKind::Else if depth == 0 && else_idx.is_none() => else_idx = Some(j),
            TagKind::Else => {}
            TagKind::EndIf if depth == 0 => return Some((else_idx, j)),
            TagKind::EndIf => depth -= 1,
        }
    }
    None
}
