//! Template previews rendered from built-in sample data, optionally editable.

pub mod handlers;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::models::{
    Education, Experience, PaymentStatus, Portfolio, Project, Skill,
};
use crate::templates::TemplateId;

/// Script injected into editable previews. Talks to the parent window over
/// `postMessage`:
/// - child → parent: `requestInitialData` on load, `edit { field, value }` when an
///   editable element loses focus, `upload { field }` when an image is clicked;
/// - parent → child: `update { data }` rewrites every `[data-field]` element,
///   `reload` re-fetches the preview after list changes.
pub const EDITOR_BRIDGE_SCRIPT: &str = r#"<script id="folio-editor-bridge">
(function () {
  var parentWindow = window.parent;
  if (!parentWindow || parentWindow === window) return;
  function post(message) { parentWindow.postMessage(message, '*'); }
  function fields() { return document.querySelectorAll('[data-field]'); }
  fields().forEach(function (el) {
    var field = el.getAttribute('data-field');
    if (el.tagName === 'IMG') {
      el.style.cursor = 'pointer';
      el.addEventListener('click', function () { post({ type: 'upload', field: field }); });
      return;
    }
    el.setAttribute('contenteditable', 'true');
    el.addEventListener('blur', function () {
      post({ type: 'edit', field: field, value: el.innerText.trim() });
    });
  });
  window.addEventListener('message', function (event) {
    var message = event.data || {};
    if (message.type === 'reload') { window.location.reload(); return; }
    if (message.type !== 'update' || !message.data) return;
    fields().forEach(function (el) {
      var value = message.data[el.getAttribute('data-field')];
      if (value === undefined || value === null) return;
      if (el.tagName === 'IMG') { el.src = value; } else if (document.activeElement !== el) { el.innerText = value; }
    });
  });
  post({ type: 'requestInitialData' });
})();
</script>"#;

/// Fixed sample content shown by every template preview. Deterministic so
/// previews can be cached and compared.
pub fn sample_portfolio(template_id: TemplateId) -> Portfolio {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
    Portfolio {
        id: Uuid::nil(),
        owner_id: "preview".to_string(),
        slug: None,
        template_id,
        name: "Alex Morgan".to_string(),
        title: "Full-Stack Developer".to_string(),
        about: "I build fast, accessible web applications.\nPreviously shipped payments infrastructure and developer tooling.".to_string(),
        email: "alex@example.com".to_string(),
        phone: "+1 555 0100".to_string(),
        location: "Lisbon, Portugal".to_string(),
        linkedin: Some("https://www.linkedin.com/in/alex-morgan".to_string()),
        github: Some("https://github.com/alex-morgan".to_string()),
        website: Some("https://alexmorgan.dev".to_string()),
        profile_picture_url: None,
        cv_url: Some("#".to_string()),
        skills: vec![
            Skill { name: "Rust".to_string(), level: Some(90) },
            Skill { name: "TypeScript".to_string(), level: Some(85) },
            Skill { name: "PostgreSQL".to_string(), level: Some(75) },
            Skill { name: "Figma".to_string(), level: None },
        ],
        experience: vec![
            Experience {
                title: "Senior Engineer".to_string(),
                company: "Northwind Labs".to_string(),
                period: "2021 - Present".to_string(),
                description: "Led the rewrite of the billing platform.\nCut p99 latency by 60%.".to_string(),
            },
            Experience {
                title: "Software Engineer".to_string(),
                company: "Contoso".to_string(),
                period: "2018 - 2021".to_string(),
                description: "Built internal developer tooling used by 200 engineers.".to_string(),
            },
        ],
        education: vec![Education {
            degree: "BSc Computer Science".to_string(),
            institution: "University of Porto".to_string(),
            period: "2014 - 2018".to_string(),
            description: String::new(),
        }],
        projects: vec![
            Project {
                title: "Ledger".to_string(),
                description: "Double-entry bookkeeping for small teams.".to_string(),
                technologies: "Rust, Axum, PostgreSQL".to_string(),
                image_url: None,
                link: Some("https://github.com/alex-morgan/ledger".to_string()),
            },
            Project {
                title: "Palette".to_string(),
                description: "Accessible colour scheme generator.".to_string(),
                technologies: "TypeScript, Svelte".to_string(),
                image_url: None,
                link: None,
            },
        ],
        payment_status: PaymentStatus::Unpaid,
        created_at: created,
        updated_at: created,
    }
}
