use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::errors::AppError;
use crate::models::{PortfolioFields, Skill};

const SLUG_MIN: usize = 3;
const SLUG_MAX: usize = 64;

lazy_static! {
    static ref SLUG: Regex = Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex");
}

/// Lowercases and trims a slug. Empty means "no slug".
pub fn normalize_slug(slug: Option<String>) -> Option<String> {
    slug.map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
}

pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    if !(SLUG_MIN..=SLUG_MAX).contains(&slug.len()) {
        return Err(AppError::Validation(format!(
            "slug must be {SLUG_MIN}-{SLUG_MAX} characters"
        )));
    }
    if !SLUG.is_match(slug) {
        return Err(AppError::Validation(
            "slug may only contain lowercase letters, digits and single hyphens".to_string(),
        ));
    }
    Ok(())
}

/// A content rule broken by one field, addressed by its editor path.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

/// Rules every write path enforces: named skills, levels within 0..=100, and
/// an email that at least has an `@`.
pub fn check_content(email: &str, skills: &[Skill]) -> Result<(), FieldViolation> {
    for (i, skill) in skills.iter().enumerate() {
        if skill.name.trim().is_empty() {
            return Err(FieldViolation {
                field: format!("skills.{i}.name"),
                reason: "skill names cannot be empty".to_string(),
            });
        }
        if skill.level.is_some_and(|l| l > 100) {
            return Err(FieldViolation {
                field: format!("skills.{i}.level"),
                reason: "level must be between 0 and 100".to_string(),
            });
        }
    }

    let email = email.trim();
    if !email.is_empty() && !email.contains('@') {
        return Err(FieldViolation {
            field: "email".to_string(),
            reason: format!("'{email}' is not an email address"),
        });
    }
    Ok(())
}

/// Checks client-supplied fields and normalizes the slug in place.
pub fn validate_fields(fields: &mut PortfolioFields) -> Result<(), AppError> {
    fields.slug = normalize_slug(fields.slug.take());
    if let Some(slug) = &fields.slug {
        validate_slug(slug)?;
    }
    check_content(&fields.email, &fields.skills)
        .map_err(|violation| AppError::Validation(violation.to_string()))
}
