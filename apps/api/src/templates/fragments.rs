//! Per-template, per-list HTML fragments.
//!
//! `{{#each list}}` blocks in a template file are replaced wholesale by the
//! fragment built here for `(template, list)`; the block body in the file is
//! never rendered. Templates without a dedicated layout share the default builders.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Education, Experience, Portfolio, Project, Skill};
use crate::templates::formatting::{code_lines, code_string, escape_html};
use crate::templates::TemplateId;

/// Image used for projects whose upload is missing or failed.
pub const DEFAULT_PROJECT_IMAGE: &str = "https://placehold.co/600x400?text=Project";

/// The repeated lists a portfolio carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Skills,
    Experience,
    Education,
    Projects,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Skills => "skills",
            ListKind::Experience => "experience",
            ListKind::Education => "education",
            ListKind::Projects => "projects",
        }
    }
}

impl FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "skills" => Ok(ListKind::Skills),
            "experience" => Ok(ListKind::Experience),
            "education" => Ok(ListKind::Education),
            "projects" => Ok(ListKind::Projects),
            other => Err(format!("unknown list '{other}'")),
        }
    }
}

/// Builds the HTML for one list of `portfolio` in the layout of `template`.
/// An empty list always yields an empty string.
pub fn build_fragment(template: TemplateId, list: ListKind, portfolio: &Portfolio) -> String {
    use TemplateId::*;

    match list {
        ListKind::Skills if portfolio.skills.is_empty() => String::new(),
        ListKind::Experience if portfolio.experience.is_empty() => String::new(),
        ListKind::Education if portfolio.education.is_empty() => String::new(),
        ListKind::Projects if portfolio.projects.is_empty() => String::new(),

        ListKind::Skills => match template {
            Template3 => terminal_skills(&portfolio.skills),
            Template5 | Template7 => tag_skills(&portfolio.skills),
            _ => default_skills(&portfolio.skills),
        },
        ListKind::Experience => match template {
            Template2 => timeline(
                ListKind::Experience,
                portfolio
                    .experience
                    .iter()
                    .map(|e| (&e.period, &e.title, &e.company, &e.description)),
            ),
            Template3 => terminal_experience(&portfolio.experience),
            _ => default_experience(&portfolio.experience),
        },
        ListKind::Education => match template {
            Template2 => timeline(
                ListKind::Education,
                portfolio
                    .education
                    .iter()
                    .map(|e| (&e.period, &e.degree, &e.institution, &e.description)),
            ),
            Template3 => terminal_education(&portfolio.education),
            _ => default_education(&portfolio.education),
        },
        ListKind::Projects => match template {
            Template3 => terminal_projects(&portfolio.projects),
            Template4 => gallery_projects(&portfolio.projects),
            _ => default_projects(&portfolio.projects),
        },
    }
}

fn item_attrs(list: ListKind, index: usize) -> String {
    format!("data-list=\"{}\" data-index=\"{index}\"", list.as_str())
}

/// Passes through http(s), mailto and relative URLs; anything else becomes `#`.
pub fn safe_url(url: &str) -> String {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    let allowed = lower.starts_with("https://")
        || lower.starts_with("http://")
        || lower.starts_with("mailto:")
        || lower.starts_with('/')
        || lower.starts_with('#')
        || !lower.contains(':');
    if allowed {
        escape_html(trimmed)
    } else {
        "#".to_string()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ── Default layouts ──

fn default_skills(skills: &[Skill]) -> String {
    let mut html = String::new();
    for (i, skill) in skills.iter().enumerate() {
        let name = escape_html(&skill.name);
        match skill.level {
            Some(level) => {
                let level = level.min(100);
                let _ = write!(
                    html,
                    "<div class=\"skill-item\" {attrs}><div class=\"skill-header\"><span class=\"skill-name\">{name}</span><span class=\"skill-percent\">{level}%</span></div><div class=\"skill-bar\"><div class=\"skill-progress\" style=\"width: {level}%\"></div></div></div>",
                    attrs = item_attrs(ListKind::Skills, i),
                );
            }
            None => {
                let _ = write!(
                    html,
                    "<div class=\"skill-item\" {attrs}><span class=\"skill-name\">{name}</span></div>",
                    attrs = item_attrs(ListKind::Skills, i),
                );
            }
        }
    }
    html
}

fn default_experience(items: &[Experience]) -> String {
    let mut html = String::new();
    for (i, item) in items.iter().enumerate() {
        let _ = write!(
            html,
            "<div class=\"experience-item\" {attrs}><h3 class=\"experience-title\">{title}</h3><div class=\"experience-meta\"><span class=\"experience-company\">{company}</span>{period}</div>{description}</div>",
            attrs = item_attrs(ListKind::Experience, i),
            title = escape_html(&item.title),
            company = escape_html(&item.company),
            period = optional_span("experience-period", &item.period),
            description = optional_paragraph("experience-description", &item.description),
        );
    }
    html
}

fn default_education(items: &[Education]) -> String {
    let mut html = String::new();
    for (i, item) in items.iter().enumerate() {
        let _ = write!(
            html,
            "<div class=\"education-item\" {attrs}><h3 class=\"education-degree\">{degree}</h3><div class=\"education-meta\"><span class=\"education-institution\">{institution}</span>{period}</div>{description}</div>",
            attrs = item_attrs(ListKind::Education, i),
            degree = escape_html(&item.degree),
            institution = escape_html(&item.institution),
            period = optional_span("education-period", &item.period),
            description = optional_paragraph("education-description", &item.description),
        );
    }
    html
}

fn default_projects(items: &[Project]) -> String {
    let mut html = String::new();
    for (i, item) in items.iter().enumerate() {
        let image = non_empty(&item.image_url)
            .map(|url| {
                format!(
                    "<img class=\"project-image\" src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                    safe_url(url),
                    escape_html(&item.title)
                )
            })
            .unwrap_or_default();
        let _ = write!(
            html,
            "<div class=\"project-card\" {attrs}>{image}<div class=\"project-content\"><h3 class=\"project-title\">{title}</h3>{description}{tech}{link}</div></div>",
            attrs = item_attrs(ListKind::Projects, i),
            title = escape_html(&item.title),
            description = optional_paragraph("project-description", &item.description),
            tech = optional_paragraph("project-tech", &item.technologies),
            link = project_link(item),
        );
    }
    html
}

fn optional_span(class: &str, text: &str) -> String {
    if text.trim().is_empty() {
        String::new()
    } else {
        format!("<span class=\"{class}\">{}</span>", escape_html(text))
    }
}

fn optional_paragraph(class: &str, text: &str) -> String {
    if text.trim().is_empty() {
        String::new()
    } else {
        format!("<p class=\"{class}\">{}</p>", escape_html(text))
    }
}

fn project_link(item: &Project) -> String {
    non_empty(&item.link)
        .map(|url| {
            format!(
                "<a class=\"project-link\" href=\"{}\" target=\"_blank\" rel=\"noopener\">View Project</a>",
                safe_url(url)
            )
        })
        .unwrap_or_default()
}

// ── Tag layout (template5, template7) ──

fn tag_skills(skills: &[Skill]) -> String {
    skills
        .iter()
        .enumerate()
        .map(|(i, skill)| {
            format!(
                "<span class=\"skill-tag\" {}>{}</span>",
                item_attrs(ListKind::Skills, i),
                escape_html(&skill.name)
            )
        })
        .collect()
}

// ── Timeline layout (template2) ──

fn timeline<'a>(
    list: ListKind,
    items: impl Iterator<Item = (&'a String, &'a String, &'a String, &'a String)>,
) -> String {
    let mut html = String::new();
    for (i, (period, heading, place, description)) in items.enumerate() {
        let _ = write!(
            html,
            "<div class=\"timeline-item\" {attrs}><div class=\"timeline-marker\"></div><div class=\"timeline-content\">{period}<h3>{heading}</h3><h4>{place}</h4>{description}</div></div>",
            attrs = item_attrs(list, i),
            period = optional_span("timeline-date", period),
            heading = escape_html(heading),
            place = escape_html(place),
            description = optional_paragraph("timeline-description", description),
        );
    }
    html
}

// ── Gallery layout (template4) ──

fn gallery_projects(items: &[Project]) -> String {
    let mut html = String::new();
    for (i, item) in items.iter().enumerate() {
        let image = non_empty(&item.image_url).unwrap_or(DEFAULT_PROJECT_IMAGE);
        let _ = write!(
            html,
            "<figure class=\"gallery-item\" {attrs}><img src=\"{src}\" alt=\"{alt}\" loading=\"lazy\"><figcaption><h3>{title}</h3>{description}{link}</figcaption></figure>",
            attrs = item_attrs(ListKind::Projects, i),
            src = safe_url(image),
            alt = escape_html(&item.title),
            title = escape_html(&item.title),
            description = optional_paragraph("gallery-description", &item.description),
            link = project_link(item),
        );
    }
    html
}

// ── Terminal layout (template3) ──

fn terminal_skills(skills: &[Skill]) -> String {
    skills
        .iter()
        .enumerate()
        .map(|(i, skill)| {
            let comment = skill
                .level
                .map(|level| format!("<span class=\"token comment\"> // {}%</span>", level.min(100)))
                .unwrap_or_default();
            format!(
                "<span class=\"code-line skill\" {}>&nbsp;&nbsp;{},{}</span>",
                item_attrs(ListKind::Skills, i),
                code_string(&skill.name),
                comment
            )
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

fn terminal_entry(list: ListKind, index: usize, command: &str, body: &str) -> String {
    format!(
        "<div class=\"terminal-entry\" {attrs}><span class=\"prompt\">$</span> <span class=\"command\">{command}</span><div class=\"output\">{body}</div></div>",
        attrs = item_attrs(list, index),
        command = escape_html(command),
    )
}

fn terminal_heading(parts: &[&str]) -> String {
    let text = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" @ ");
    format!(
        "<span class=\"code-line token comment\"># {}</span>",
        escape_html(&text)
    )
}

fn terminal_body(heading: String, period: &str, description: &str) -> String {
    let mut lines = vec![heading];
    if !period.trim().is_empty() {
        lines.push(format!(
            "<span class=\"code-line token comment\"># {}</span>",
            escape_html(period.trim())
        ));
    }
    let description = code_lines(description);
    if !description.is_empty() {
        lines.push(description);
    }
    lines.join("<br>")
}

fn terminal_experience(items: &[Experience]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            terminal_entry(
                ListKind::Experience,
                i,
                &format!("cat experience/{}.log", i + 1),
                &terminal_body(
                    terminal_heading(&[&item.title, &item.company]),
                    &item.period,
                    &item.description,
                ),
            )
        })
        .collect()
}

fn terminal_education(items: &[Education]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            terminal_entry(
                ListKind::Education,
                i,
                &format!("cat education/{}.md", i + 1),
                &terminal_body(
                    terminal_heading(&[&item.degree, &item.institution]),
                    &item.period,
                    &item.description,
                ),
            )
        })
        .collect()
}

fn terminal_projects(items: &[Project]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut body = terminal_body(terminal_heading(&[&item.title]), "", &item.description);
            if !item.technologies.trim().is_empty() {
                let _ = write!(
                    body,
                    "<br><span class=\"code-line\">stack: {}</span>",
                    escape_html(item.technologies.trim())
                );
            }
            let link = project_link(item);
            if !link.is_empty() {
                body.push_str("<br>");
                body.push_str(&link);
            }
            terminal_entry(
                ListKind::Projects,
                i,
                &format!("./{}", command_name(&item.title)),
                &body,
            )
        })
        .collect()
}

/// `"My Cool App"` → `my-cool-app`.
fn command_name(title: &str) -> String {
    let name = title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-");
    if name.is_empty() {
        "project".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PortfolioFields;

    fn portfolio() -> Portfolio {
        Portfolio::new(
            "user-1",
            PortfolioFields {
                name: "Ada Lovelace".to_string(),
                skills: vec![
                    Skill {
                        name: "Rust".to_string(),
                        level: Some(90),
                    },
                    Skill {
                        name: "Analytical Engines".to_string(),
                        level: None,
                    },
                ],
                experience: vec![Experience {
                    title: "Mathematician".to_string(),
                    company: "Babbage & Co".to_string(),
                    period: "1842 - 1843".to_string(),
                    description: "Wrote the first program.\nPublished notes.".to_string(),
                }],
                education: vec![Education {
                    degree: "Private tutoring".to_string(),
                    institution: "Home".to_string(),
                    ..Default::default()
                }],
                projects: vec![Project {
                    title: "Note G".to_string(),
                    description: "Bernoulli numbers".to_string(),
                    technologies: "Punch cards".to_string(),
                    image_url: None,
                    link: Some("javascript:alert(1)".to_string()),
                }],
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_empty_lists_yield_empty_fragments_for_every_template() {
        let empty = Portfolio::new("user-1", PortfolioFields::default());
        for template in TemplateId::ALL {
            for list in [
                ListKind::Skills,
                ListKind::Experience,
                ListKind::Education,
                ListKind::Projects,
            ] {
                assert_eq!(build_fragment(template, list, &empty), "");
            }
        }
    }

    #[test]
    fn test_default_skills_render_progress_bar_only_with_level() {
        let html = build_fragment(TemplateId::Template1, ListKind::Skills, &portfolio());
        assert!(html.contains("style=\"width: 90%\""));
        assert_eq!(html.matches("skill-progress").count(), 1);
        assert!(html.contains("data-list=\"skills\" data-index=\"1\""));
    }

    #[test]
    fn test_default_experience_escapes_content() {
        let html = build_fragment(TemplateId::Template1, ListKind::Experience, &portfolio());
        assert!(html.contains("Babbage &amp; Co"));
        assert!(html.contains("experience-period"));
    }

    #[test]
    fn test_missing_period_is_omitted() {
        let html = build_fragment(TemplateId::Template1, ListKind::Education, &portfolio());
        assert!(!html.contains("education-period"));
        assert!(!html.contains("education-description"));
    }

    #[test]
    fn test_template2_uses_timeline() {
        let html = build_fragment(TemplateId::Template2, ListKind::Experience, &portfolio());
        assert!(html.starts_with("<div class=\"timeline-item\""));
    }

    #[test]
    fn test_template3_formats_descriptions_as_code_lines() {
        let html = build_fragment(TemplateId::Template3, ListKind::Experience, &portfolio());
        assert!(html.contains("cat experience/1.log"));
        assert!(html.contains(
            "<span class=\"code-line\">Wrote the first program.</span><br><span class=\"code-line\">Published notes.</span>"
        ));
        assert!(!html.contains('\n'));
    }

    #[test]
    fn test_template3_skills_are_string_tokens() {
        let html = build_fragment(TemplateId::Template3, ListKind::Skills, &portfolio());
        assert!(html.contains("\"Rust\""));
        assert!(html.contains("// 90%"));
    }

    #[test]
    fn test_template5_skills_are_tags() {
        let html = build_fragment(TemplateId::Template5, ListKind::Skills, &portfolio());
        assert_eq!(html.matches("skill-tag").count(), 2);
        assert!(!html.contains("skill-bar"));
    }

    #[test]
    fn test_gallery_falls_back_to_placeholder_image() {
        let html = build_fragment(TemplateId::Template4, ListKind::Projects, &portfolio());
        assert!(html.contains(&escape_html(DEFAULT_PROJECT_IMAGE)));
    }

    #[test]
    fn test_unsafe_links_are_neutralized() {
        let html = build_fragment(TemplateId::Template1, ListKind::Projects, &portfolio());
        assert!(!html.contains("javascript:"));
        assert!(html.contains("href=\"#\""));
    }

    #[test]
    fn test_safe_url_keeps_http_and_relative() {
        assert_eq!(safe_url("https://example.com/a"), "https://example.com/a");
        assert_eq!(safe_url("/img/me.png"), "/img/me.png");
        assert_eq!(safe_url("mailto:ada@example.com"), "mailto:ada@example.com");
        assert_eq!(safe_url("data:text/html,hi"), "#");
    }

    #[test]
    fn test_command_name_slugifies_titles() {
        assert_eq!(command_name("My Cool App!"), "my-cool-app");
        assert_eq!(command_name("***"), "project");
    }

    #[test]
    fn test_list_kind_parses() {
        assert_eq!("projects".parse::<ListKind>(), Ok(ListKind::Projects));
        assert!("hobbies".parse::<ListKind>().is_err());
    }
}
