use crate::generation::inline::inline_assets;
use crate::generation::minify::minify_html;
use crate::generation::seo::{inject_before_body_end, inject_before_head_end, SeoMeta};
use crate::models::Portfolio;
use crate::templates::substitution::{render_template, RenderContext};
use crate::templates::TemplateFiles;

/// Post-processing switches for one render.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Head tags to inject; `None` for previews.
    pub seo: Option<SeoMeta>,
    /// Markup appended right before `</body>` (e.g. the editing bridge script).
    pub body_snippet: Option<String>,
    pub minify: bool,
}

impl RenderOptions {
    /// Options used for published output.
    pub fn published(portfolio: &Portfolio, site_base_url: &str) -> Self {
        RenderOptions {
            seo: Some(SeoMeta::for_portfolio(portfolio, site_base_url)),
            body_snippet: None,
            minify: true,
        }
    }
}

/// Turns template files plus a portfolio into one self-contained HTML document.
///
/// Steps: substitution → inline CSS/JS → SEO head tags → body snippet → minify.
/// Infallible once the files are loaded; deterministic for identical input.
pub fn render_portfolio_html(
    files: &TemplateFiles,
    portfolio: &Portfolio,
    options: &RenderOptions,
) -> String {
    let ctx = RenderContext::for_portfolio(portfolio, files.template_id);
    let substituted = render_template(&files.html, files.template_id, portfolio, &ctx);

    let mut html = inline_assets(&substituted, &files.css, &files.js);
    if let Some(seo) = &options.seo {
        html = inject_before_head_end(&html, &seo.head_html());
    }
    if let Some(snippet) = &options.body_snippet {
        html = inject_before_body_end(&html, snippet);
    }
    if options.minify {
        html = minify_html(&html);
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PortfolioFields, Skill};
    use crate::templates::test_files::{SAMPLE_CSS, SAMPLE_HTML, SAMPLE_JS};
    use crate::templates::TemplateId;

    fn files(template_id: TemplateId) -> TemplateFiles {
        TemplateFiles {
            template_id,
            dir: std::path::PathBuf::from("unused"),
            html: SAMPLE_HTML.to_string(),
            css: SAMPLE_CSS.to_string(),
            js: SAMPLE_JS.to_string(),
        }
    }

    fn ada() -> Portfolio {
        Portfolio::new(
            "user-1",
            PortfolioFields {
                name: "Ada Lovelace".to_string(),
                title: "Mathematician".to_string(),
                about: "Wrote the first program.\nDreamed of music machines.".to_string(),
                email: "ada@example.com".to_string(),
                profile_picture_url: Some("https://cdn.example.com/ada.png".to_string()),
                skills: vec![Skill {
                    name: "Analysis".to_string(),
                    level: Some(95),
                }],
                ..Default::default()
            },
        )
    }

    fn published(p: &Portfolio) -> RenderOptions {
        RenderOptions::published(p, "https://folio.dev")
    }

    #[test]
    fn test_profile_picture_branch_kept_for_every_template() {
        let p = ada();
        for template in TemplateId::ALL {
            let html = render_portfolio_html(&files(template), &p, &published(&p));
            assert!(!html.contains("{{profilePictureUrl}}"), "{template}");
            assert!(html.contains("<img class=\"avatar\" src=\"https://cdn.example.com/ada.png\""));
            assert!(!html.contains("class=\"initials\""), "{template}");
        }
    }

    #[test]
    fn test_initials_branch_when_no_picture() {
        let mut p = ada();
        p.profile_picture_url = None;
        let html = render_portfolio_html(&files(TemplateId::Template1), &p, &published(&p));
        assert!(html.contains("<div class=\"initials\">AL</div>"));
        assert!(!html.contains("class=\"avatar\""));
    }

    #[test]
    fn test_cv_block_removed_without_cv() {
        let p = ada();
        assert!(!p.has_cv());
        let html = render_portfolio_html(&files(TemplateId::Template1), &p, &published(&p));
        assert!(!html.contains("cv-download"));
        assert!(!html.contains("Download CV"));
    }

    #[test]
    fn test_cv_block_kept_with_cv() {
        let mut p = ada();
        p.cv_url = Some("https://cdn.example.com/cv.pdf".to_string());
        let html = render_portfolio_html(&files(TemplateId::Template1), &p, &published(&p));
        assert!(html.contains("<a class=\"cv-download\" href=\"https://cdn.example.com/cv.pdf\">"));
    }

    #[test]
    fn test_no_placeholder_syntax_survives() {
        let p = ada();
        let html = render_portfolio_html(&files(TemplateId::Template5), &p, &published(&p));
        assert!(!html.contains("{{"));
        assert!(!html.contains("}}"));
    }

    #[test]
    fn test_assets_inlined_seo_injected_and_minified() {
        let p = ada();
        let html = render_portfolio_html(&files(TemplateId::Template1), &p, &published(&p));
        assert!(html.contains("<style>body{margin:0;color:#222}</style>"));
        assert!(html.contains("document.body.dataset.ready"));
        assert!(!html.contains("theme toggle"));
        assert!(!html.contains("<!-- hero -->"));
        assert!(!html.contains("css/styles.css"));
        assert!(html.contains("og:image"));
        let og = html.find("og:title").unwrap();
        assert!(og < html.find("</head>").unwrap());
    }

    #[test]
    fn test_rendering_twice_is_byte_identical() {
        let p = ada();
        let first = render_portfolio_html(&files(TemplateId::Template2), &p, &published(&p));
        let second = render_portfolio_html(&files(TemplateId::Template2), &p, &published(&p));
        assert_eq!(first, second);
    }

    #[test]
    fn test_template3_about_has_no_raw_newlines() {
        let p = ada();
        let html = render_portfolio_html(&files(TemplateId::Template3), &p, &published(&p));
        assert!(html.contains(
            "<p class=\"about\"><span class=\"code-line\">Wrote the first program.</span><br><span class=\"code-line\">Dreamed of music machines.</span></p>"
        ));
        assert!(!html.contains("program.\nDreamed"));
    }

    #[test]
    fn test_empty_skills_renders_empty_container() {
        let mut p = ada();
        p.skills.clear();
        let html = render_portfolio_html(&files(TemplateId::Template1), &p, &published(&p));
        assert!(html.contains("<div class=\"skills\"></div>"));
        assert!(!html.contains("undefined"));
        assert!(!html.contains("this.name"));
    }

    #[test]
    fn test_body_snippet_injected_before_body_end() {
        let p = ada();
        let options = RenderOptions {
            body_snippet: Some("<script>bridge()</script>".to_string()),
            ..Default::default()
        };
        let html = render_portfolio_html(&files(TemplateId::Template1), &p, &options);
        assert!(html.contains("<script>bridge()</script></body>"));
        assert!(!html.contains("og:title"));
    }
}
