//! Portfolio templates: the closed set of layouts, their files on disk, and the
//! substitution engine that fills them with a portfolio's data.

pub mod formatting;
pub mod fragments;
pub mod substitution;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;

pub const INDEX_FILE: &str = "index.html";
pub const STYLESHEET_FILE: &str = "css/styles.css";
pub const SCRIPT_FILE: &str = "js/script.js";

/// Identifier of one visual layout. Serialized as `template1` … `template8`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Template1,
    Template2,
    Template3,
    Template4,
    Template5,
    Template6,
    Template7,
    Template8,
}

impl TemplateId {
    pub const ALL: [TemplateId; 8] = [
        TemplateId::Template1,
        TemplateId::Template2,
        TemplateId::Template3,
        TemplateId::Template4,
        TemplateId::Template5,
        TemplateId::Template6,
        TemplateId::Template7,
        TemplateId::Template8,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Template1 => "template1",
            TemplateId::Template2 => "template2",
            TemplateId::Template3 => "template3",
            TemplateId::Template4 => "template4",
            TemplateId::Template5 => "template5",
            TemplateId::Template6 => "template6",
            TemplateId::Template7 => "template7",
            TemplateId::Template8 => "template8",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TemplateId::Template1 => "Classic",
            TemplateId::Template2 => "Timeline",
            TemplateId::Template3 => "Terminal",
            TemplateId::Template4 => "Creative",
            TemplateId::Template5 => "Cards",
            TemplateId::Template6 => "Corporate",
            TemplateId::Template7 => "Minimal",
            TemplateId::Template8 => "Dark Mode",
        }
    }

    /// Whether multi-line text is rendered as code lines.
    pub fn uses_code_formatting(&self) -> bool {
        matches!(self, TemplateId::Template3)
    }

    pub fn dir(&self, templates_root: &Path) -> PathBuf {
        templates_root.join(self.as_str())
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("unknown template '{s}'"))
    }
}

/// Raw text of one template, loaded from disk.
#[derive(Debug, Clone)]
pub struct TemplateFiles {
    pub template_id: TemplateId,
    pub dir: PathBuf,
    pub html: String,
    pub css: String,
    pub js: String,
}

impl TemplateFiles {
    /// Reads `index.html`, the stylesheet and the script concurrently.
    /// Only `index.html` is mandatory; a missing stylesheet or script reads as empty.
    pub async fn load(templates_root: &Path, template_id: TemplateId) -> Result<Self, AppError> {
        let dir = template_id.dir(templates_root);

        let (html, css, js) = tokio::join!(
            tokio::fs::read_to_string(dir.join(INDEX_FILE)),
            read_optional(dir.join(STYLESHEET_FILE)),
            read_optional(dir.join(SCRIPT_FILE)),
        );

        let html = html.map_err(|e| {
            AppError::Template(format!(
                "cannot read {} for {template_id}: {e}",
                dir.join(INDEX_FILE).display()
            ))
        })?;

        debug!(
            "Loaded {template_id}: html={}B css={}B js={}B",
            html.len(),
            css.len(),
            js.len()
        );

        Ok(TemplateFiles {
            template_id,
            dir,
            html,
            css,
            js,
        })
    }
}

async fn read_optional(path: PathBuf) -> String {
    match tokio::fs::try_exists(&path).await {
        Ok(true) => tokio::fs::read_to_string(&path).await.unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod test_files {
    use std::path::Path;

    use super::TemplateId;

    /// A compact template exercising every placeholder form.
    pub const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>{{name}} | {{title}}</title>
  <link rel="stylesheet" href="css/styles.css">
</head>
<body>
  <!-- hero -->
  <header>
    {{#if profilePictureUrl}}<img class="avatar" src="{{profilePictureUrl}}" alt="{{name}}">{{else}}<div class="initials">{{initials}}</div>{{/if}}
    <h1>{{name}}</h1>
    <p class="role">{{title}}</p>
  </header>
  <section id="about"><p class="about">{{about}}</p></section>
  <section id="skills"><div class="skills">{{#each skills}}<span>{{this.name}}</span>{{/each}}</div></section>
  <section id="experience">{{#each experience}}<div>{{this.title}}</div>{{/each}}</section>
  <section id="education">{{#each education}}<div>{{this.degree}}</div>{{/each}}</section>
  <section id="projects">{{#each projects}}<div>{{this.title}}</div>{{/each}}</section>
  {{#if hasCv}}<a class="cv-download" href="{{cvUrl}}">Download CV</a>{{/if}}
  <footer><a href="mailto:{{email}}">{{email}}</a></footer>
  <script src="js/script.js"></script>
</body>
</html>
"#;

    pub const SAMPLE_CSS: &str = "/* base */\nbody {\n  margin: 0;\n  color: #222;\n}\n";
    pub const SAMPLE_JS: &str = "// theme toggle\ndocument.body.dataset.ready = 'true';\n";

    /// Writes the sample template under `root/<id>/`, with an `img/` directory.
    pub fn write_template(root: &Path, template_id: TemplateId) {
        let dir = template_id.dir(root);
        std::fs::create_dir_all(dir.join("css")).unwrap();
        std::fs::create_dir_all(dir.join("js")).unwrap();
        std::fs::create_dir_all(dir.join("img")).unwrap();
        std::fs::write(dir.join("index.html"), SAMPLE_HTML).unwrap();
        std::fs::write(dir.join("css/styles.css"), SAMPLE_CSS).unwrap();
        std::fs::write(dir.join("js/script.js"), SAMPLE_JS).unwrap();
        std::fs::write(dir.join("img/pattern.svg"), "<svg/>").unwrap();
        std::fs::write(dir.join("favicon.ico"), [0u8, 1, 2]).unwrap();
    }
}
