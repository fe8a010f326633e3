//! Live-editor protocol: the messages the editable preview exchanges with the
//! editor page, applied to a stored portfolio.

pub mod handlers;

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::Portfolio;
use crate::portfolios::validation::check_content;
use crate::templates::fragments::ListKind;
use crate::templates::TemplateId;

/// One editor message, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorMessage {
    /// Text edit of a scalar field, or of one list item field (`experience.0.title`).
    Edit { field: String, value: String },
    /// An upload finished; `url` replaces the image or document at `field`.
    Upload { field: String, url: String },
    /// Appends an item. Without `item` an empty one is added; skills need a name.
    Add {
        list: ListKind,
        #[serde(default)]
        item: Option<Value>,
    },
    Remove { list: ListKind, index: usize },
    /// Replaces one list item wholesale.
    Update {
        list: ListKind,
        index: usize,
        item: Value,
    },
    /// The preview wants the current document; nothing changes.
    RequestInitialData,
}

impl EditorMessage {
    pub fn mutates(&self) -> bool {
        !matches!(self, EditorMessage::RequestInitialData)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EditorError {
    #[error("field '{0}' cannot be edited")]
    UnknownField(String),

    #[error("{list} has no item at index {index}")]
    IndexOutOfRange { list: &'static str, index: usize },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Dispatches on `list`, binding `$items` to the matching `Vec` of `$portfolio`.
macro_rules! with_list {
    ($portfolio:expr, $list:expr, $items:ident => $body:expr) => {
        match $list {
            ListKind::Skills => {
                let $items = &mut $portfolio.skills;
                $body
            }
            ListKind::Experience => {
                let $items = &mut $portfolio.experience;
                $body
            }
            ListKind::Education => {
                let $items = &mut $portfolio.education;
                $body
            }
            ListKind::Projects => {
                let $items = &mut $portfolio.projects;
                $body
            }
        }
    };
}

/// Applies `message` to `portfolio`. On error the portfolio is left unchanged.
pub fn apply(portfolio: &mut Portfolio, message: &EditorMessage) -> Result<(), EditorError> {
    let mut draft = portfolio.clone();

    match message {
        EditorMessage::Edit { field, value } => edit_field(&mut draft, field, value)?,
        EditorMessage::Upload { field, url } => upload_field(&mut draft, field, url)?,
        EditorMessage::Add { list, item } => {
            let name = list.as_str();
            with_list!(draft, list, items => items.push(match item {
                Some(v) => item_from_value(name, v.clone())?,
                None => Default::default(),
            }))
        }
        EditorMessage::Remove { list, index } => {
            let name = list.as_str();
            with_list!(draft, list, items => {
                check_index(name, items.len(), *index)?;
                items.remove(*index);
            })
        }
        EditorMessage::Update { list, index, item } => {
            let name = list.as_str();
            with_list!(draft, list, items => {
                check_index(name, items.len(), *index)?;
                items[*index] = item_from_value(name, item.clone())?;
            })
        }
        EditorMessage::RequestInitialData => return Ok(()),
    }

    validate_content(&draft)?;
    draft.updated_at = Utc::now();
    *portfolio = draft;
    Ok(())
}

fn edit_field(p: &mut Portfolio, field: &str, value: &str) -> Result<(), EditorError> {
    let optional = |v: &str| Some(v.trim().to_string()).filter(|v| !v.is_empty());

    match field {
        "name" => p.name = value.to_string(),
        "title" => p.title = value.to_string(),
        "about" => p.about = value.to_string(),
        "email" => p.email = value.trim().to_string(),
        "phone" => p.phone = value.trim().to_string(),
        "location" => p.location = value.to_string(),
        "linkedin" => p.linkedin = optional(value),
        "github" => p.github = optional(value),
        "website" => p.website = optional(value),
        "templateId" => {
            p.template_id = value
                .parse::<TemplateId>()
                .map_err(|reason| EditorError::InvalidValue {
                    field: field.to_string(),
                    reason,
                })?
        }
        path => {
            let (list, index, key) = split_item_path(path)?;
            let name = list.as_str();
            with_list!(p, list, items => {
                check_index(name, items.len(), index)?;
                items[index] = edit_item(&items[index], path, key, value)?;
            })
        }
    }
    Ok(())
}

fn upload_field(p: &mut Portfolio, field: &str, url: &str) -> Result<(), EditorError> {
    let url = Some(url.trim().to_string()).filter(|u| !u.is_empty());
    match field {
        "profilePictureUrl" => p.profile_picture_url = url,
        "cvUrl" => p.cv_url = url,
        path => match split_item_path(path)? {
            (ListKind::Projects, index, "imageUrl") => {
                check_index("projects", p.projects.len(), index)?;
                p.projects[index].image_url = url;
            }
            _ => return Err(EditorError::UnknownField(path.to_string())),
        },
    }
    Ok(())
}

/// `experience.2.title` → (Experience, 2, "title").
fn split_item_path(path: &str) -> Result<(ListKind, usize, &str), EditorError> {
    let unknown = || EditorError::UnknownField(path.to_string());
    let mut parts = path.splitn(3, '.');
    let list: ListKind = parts.next().ok_or_else(unknown)?.parse().map_err(|_| unknown())?;
    let index: usize = parts.next().ok_or_else(unknown)?.parse().map_err(|_| unknown())?;
    let key = parts.next().filter(|k| !k.is_empty()).ok_or_else(unknown)?;
    Ok((list, index, key))
}

fn check_index(list: &'static str, len: usize, index: usize) -> Result<(), EditorError> {
    if index < len {
        Ok(())
    } else {
        Err(EditorError::IndexOutOfRange { list, index })
    }
}

/// Sets `key` on a list item through its JSON form. Only keys the item already
/// has are accepted; numeric fields take a number, an empty value clears it.
fn edit_item<T: Serialize + DeserializeOwned>(
    item: &T,
    path: &str,
    key: &str,
    value: &str,
) -> Result<T, EditorError> {
    let invalid = |reason: String| EditorError::InvalidValue {
        field: path.to_string(),
        reason,
    };

    let mut json = serde_json::to_value(item).map_err(|e| invalid(e.to_string()))?;
    let slot = json
        .get_mut(key)
        .ok_or_else(|| EditorError::UnknownField(path.to_string()))?;

    *slot = if value.trim().is_empty() && slot.is_null() {
        Value::Null
    } else if slot.is_number() || (slot.is_null() && key == "level") {
        match value.trim() {
            "" => Value::Null,
            n => n
                .parse::<u64>()
                .map(Value::from)
                .map_err(|_| invalid(format!("'{n}' is not a number")))?,
        }
    } else {
        Value::String(value.to_string())
    };

    serde_json::from_value(json).map_err(|e| invalid(e.to_string()))
}

fn item_from_value<T: DeserializeOwned>(list: &str, value: Value) -> Result<T, EditorError> {
    serde_json::from_value(value).map_err(|e| EditorError::InvalidValue {
        field: list.to_string(),
        reason: e.to_string(),
    })
}

fn validate_content(p: &Portfolio) -> Result<(), EditorError> {
    check_content(&p.email, &p.skills).map_err(|violation| EditorError::InvalidValue {
        field: violation.field,
        reason: violation.reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Experience, PortfolioFields, Skill};
    use serde_json::json;

    fn portfolio() -> Portfolio {
        Portfolio::new(
            "u1",
            PortfolioFields {
                name: "Ada".to_string(),
                skills: vec![Skill {
                    name: "Rust".to_string(),
                    level: Some(80),
                }],
                experience: vec![Experience {
                    title: "Engineer".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            },
        )
    }

    fn parse(value: serde_json::Value) -> EditorMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_messages_deserialize_from_wire_format() {
        assert_eq!(
            parse(json!({ "type": "edit", "field": "name", "value": "Grace" })),
            EditorMessage::Edit {
                field: "name".to_string(),
                value: "Grace".to_string()
            }
        );
        assert_eq!(
            parse(json!({ "type": "requestInitialData" })),
            EditorMessage::RequestInitialData
        );
        assert_eq!(
            parse(json!({ "type": "add", "list": "projects" })),
            EditorMessage::Add {
                list: ListKind::Projects,
                item: None
            }
        );
    }

    #[test]
    fn test_edit_scalar_field() {
        let mut p = portfolio();
        apply(&mut p, &parse(json!({ "type": "edit", "field": "title", "value": "Analyst" }))).unwrap();
        assert_eq!(p.title, "Analyst");
    }

    #[test]
    fn test_edit_list_item_field() {
        let mut p = portfolio();
        apply(
            &mut p,
            &parse(json!({ "type": "edit", "field": "experience.0.company", "value": "Babbage & Co" })),
        )
        .unwrap();
        assert_eq!(p.experience[0].company, "Babbage & Co");

        apply(&mut p, &parse(json!({ "type": "edit", "field": "skills.0.level", "value": "95" }))).unwrap();
        assert_eq!(p.skills[0].level, Some(95));
    }

    #[test]
    fn test_unknown_field_is_rejected_and_nothing_changes() {
        let mut p = portfolio();
        let before = p.clone();
        for field in ["ownerId", "paymentStatus", "experience.0.salary", "hobbies.0.name"] {
            let err = apply(
                &mut p,
                &EditorMessage::Edit {
                    field: field.to_string(),
                    value: "x".to_string(),
                },
            )
            .unwrap_err();
            assert_eq!(err, EditorError::UnknownField(field.to_string()));
        }
        assert_eq!(p, before);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut p = portfolio();
        let err = apply(
            &mut p,
            &EditorMessage::Remove {
                list: ListKind::Experience,
                index: 3,
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            EditorError::IndexOutOfRange {
                list: "experience",
                index: 3
            }
        );
    }

    #[test]
    fn test_add_update_remove() {
        let mut p = portfolio();
        apply(&mut p, &parse(json!({ "type": "add", "list": "education" }))).unwrap();
        assert_eq!(p.education.len(), 1);

        apply(
            &mut p,
            &parse(json!({
                "type": "update", "list": "education", "index": 0,
                "item": { "degree": "BSc", "institution": "London" }
            })),
        )
        .unwrap();
        assert_eq!(p.education[0].degree, "BSc");

        apply(&mut p, &parse(json!({ "type": "remove", "list": "education", "index": 0 }))).unwrap();
        assert!(p.education.is_empty());
    }

    #[test]
    fn test_skill_level_above_100_rejected() {
        let mut p = portfolio();
        let result = apply(
            &mut p,
            &parse(json!({ "type": "add", "list": "skills", "item": { "name": "Go", "level": 140 } })),
        );
        assert!(matches!(result, Err(EditorError::InvalidValue { .. })));
        assert_eq!(p.skills.len(), 1);
    }

    #[test]
    fn test_upload_sets_urls() {
        let mut p = portfolio();
        apply(
            &mut p,
            &parse(json!({ "type": "upload", "field": "profilePictureUrl", "url": "https://cdn/x.png" })),
        )
        .unwrap();
        assert_eq!(p.profile_picture_url.as_deref(), Some("https://cdn/x.png"));

        let err = apply(
            &mut p,
            &parse(json!({ "type": "upload", "field": "name", "url": "https://cdn/x.png" })),
        )
        .unwrap_err();
        assert_eq!(err, EditorError::UnknownField("name".to_string()));
    }

    #[test]
    fn test_template_switch_validates_id() {
        let mut p = portfolio();
        apply(&mut p, &parse(json!({ "type": "edit", "field": "templateId", "value": "template8" }))).unwrap();
        assert_eq!(p.template_id, TemplateId::Template8);
        assert!(apply(&mut p, &parse(json!({ "type": "edit", "field": "templateId", "value": "nope" }))).is_err());
    }

    #[test]
    fn test_edits_follow_document_rules() {
        let mut p = portfolio();
        let err = apply(&mut p, &parse(json!({ "type": "edit", "field": "email", "value": "ada.example.com" })))
            .unwrap_err();
        assert!(matches!(err, EditorError::InvalidValue { ref field, .. } if field == "email"));

        let err = apply(&mut p, &parse(json!({ "type": "edit", "field": "skills.0.name", "value": "  " })))
            .unwrap_err();
        assert!(matches!(err, EditorError::InvalidValue { ref field, .. } if field == "skills.0.name"));
        assert!(apply(&mut p, &parse(json!({ "type": "add", "list": "skills" }))).is_err());

        let original = portfolio();
        assert_eq!(p.email, original.email);
        assert_eq!(p.skills, original.skills);
    }
}
