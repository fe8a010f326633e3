use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::templates::TemplateId;

/// Canonical payment state of a portfolio. Replaces the old
/// `isPreviewPaid` + `paymentStatus` pair.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    /// Proficiency as a percentage, 0..=100.
    #[serde(default)]
    pub level: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub technologies: String,
    pub image_url: Option<String>,
    pub link: Option<String>,
}

/// A user's portfolio document. One owner, immutable `id`, optional unique `slug`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: Uuid,
    pub owner_id: String,
    pub slug: Option<String>,
    pub template_id: TemplateId,
    pub name: String,
    pub title: String,
    pub about: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
    pub profile_picture_url: Option<String>,
    pub cv_url: Option<String>,
    pub skills: Vec<Skill>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-editable portion of a portfolio, used by create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioFields {
    pub slug: Option<String>,
    pub template_id: Option<TemplateId>,
    pub name: String,
    pub title: String,
    pub about: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
    pub profile_picture_url: Option<String>,
    pub cv_url: Option<String>,
    pub skills: Vec<Skill>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
}

impl Portfolio {
    /// Builds a fresh, unpaid document owned by `owner_id`.
    pub fn new(owner_id: impl Into<String>, fields: PortfolioFields) -> Self {
        let now = Utc::now();
        let mut portfolio = Portfolio {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            slug: None,
            template_id: TemplateId::default(),
            name: String::new(),
            title: String::new(),
            about: String::new(),
            email: String::new(),
            phone: String::new(),
            location: String::new(),
            linkedin: None,
            github: None,
            website: None,
            profile_picture_url: None,
            cv_url: None,
            skills: Vec::new(),
            experience: Vec::new(),
            education: Vec::new(),
            projects: Vec::new(),
            payment_status: PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
        };
        portfolio.apply_fields(fields);
        portfolio.updated_at = now;
        portfolio
    }

    /// Overwrites every client-editable field. `id`, owner and payment state are untouched.
    pub fn apply_fields(&mut self, fields: PortfolioFields) {
        self.slug = fields.slug.filter(|s| !s.trim().is_empty());
        if let Some(template_id) = fields.template_id {
            self.template_id = template_id;
        }
        self.name = fields.name;
        self.title = fields.title;
        self.about = fields.about;
        self.email = fields.email;
        self.phone = fields.phone;
        self.location = fields.location;
        self.linkedin = fields.linkedin;
        self.github = fields.github;
        self.website = fields.website;
        self.profile_picture_url = fields.profile_picture_url;
        self.cv_url = fields.cv_url;
        self.skills = fields.skills;
        self.experience = fields.experience;
        self.education = fields.education;
        self.projects = fields.projects;
        self.updated_at = Utc::now();
    }

    pub fn has_cv(&self) -> bool {
        self.cv_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// Initials shown when no profile picture exists: first letters of the
    /// first and last word. Defaults to "P" for an empty name.
    pub fn initials(&self) -> String {
        initials_for(&self.name)
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

pub fn initials_for(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let letters: String = match words.as_slice() {
        [] => return "P".to_string(),
        [only] => only.chars().take(1).collect(),
        [first, .., last] => first.chars().take(1).chain(last.chars().take(1)).collect(),
    };
    letters.to_uppercase()
}
