use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::{Education, Experience, PaymentStatus, Portfolio, Project, Skill};
use crate::store::{PortfolioStore, SlugTaken};

#[derive(Debug, Clone, FromRow)]
struct PortfolioRow {
    id: Uuid,
    owner_id: String,
    slug: Option<String>,
    template_id: String,
    name: String,
    title: String,
    about: String,
    email: String,
    phone: String,
    location: String,
    linkedin: Option<String>,
    github: Option<String>,
    website: Option<String>,
    profile_picture_url: Option<String>,
    cv_url: Option<String>,
    skills: Json<Vec<Skill>>,
    experience: Json<Vec<Experience>>,
    education: Json<Vec<Education>>,
    projects: Json<Vec<Project>>,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PortfolioRow> for Portfolio {
    type Error = anyhow::Error;

    fn try_from(row: PortfolioRow) -> Result<Self> {
        Ok(Portfolio {
            id: row.id,
            owner_id: row.owner_id,
            slug: row.slug,
            template_id: row
                .template_id
                .parse()
                .map_err(|e: String| anyhow::anyhow!("portfolio {}: {e}", row.id))?,
            name: row.name,
            title: row.title,
            about: row.about,
            email: row.email,
            phone: row.phone,
            location: row.location,
            linkedin: row.linkedin,
            github: row.github,
            website: row.website,
            profile_picture_url: row.profile_picture_url,
            cv_url: row.cv_url,
            skills: row.skills.0,
            experience: row.experience.0,
            education: row.education.0,
            projects: row.projects.0,
            payment_status: row
                .payment_status
                .parse()
                .map_err(|e: String| anyhow::anyhow!("portfolio {}: {e}", row.id))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `portfolios` table. Lists are stored as JSONB.
#[derive(Clone)]
pub struct PgPortfolioStore {
    pool: PgPool,
}

impl PgPortfolioStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Turns a unique-index violation into `SlugTaken`; id is a UUID, so slug is
/// the only unique column a write can collide on.
fn slug_conflict(err: sqlx::Error, p: &Portfolio) -> anyhow::Error {
    let unique = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION);
    match (&p.slug, unique) {
        (Some(slug), true) => SlugTaken(slug.clone()).into(),
        _ => anyhow::Error::new(err).context(format!("write portfolio {}", p.id)),
    }
}

fn into_portfolios(rows: Vec<PortfolioRow>) -> Result<Vec<Portfolio>> {
    rows.into_iter().map(Portfolio::try_from).collect()
}

#[async_trait]
impl PortfolioStore for PgPortfolioStore {
    async fn insert(&self, p: &Portfolio) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO portfolios
                (id, owner_id, slug, template_id, name, title, about, email, phone, location,
                 linkedin, github, website, profile_picture_url, cv_url,
                 skills, experience, education, projects, payment_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22)
            "#,
        )
        .bind(p.id)
        .bind(&p.owner_id)
        .bind(&p.slug)
        .bind(p.template_id.as_str())
        .bind(&p.name)
        .bind(&p.title)
        .bind(&p.about)
        .bind(&p.email)
        .bind(&p.phone)
        .bind(&p.location)
        .bind(&p.linkedin)
        .bind(&p.github)
        .bind(&p.website)
        .bind(&p.profile_picture_url)
        .bind(&p.cv_url)
        .bind(Json(&p.skills))
        .bind(Json(&p.experience))
        .bind(Json(&p.education))
        .bind(Json(&p.projects))
        .bind(p.payment_status.as_str())
        .bind(p.created_at)
        .bind(p.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| slug_conflict(e, p))?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Portfolio>> {
        sqlx::query_as::<_, PortfolioRow>("SELECT * FROM portfolios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Portfolio::try_from)
            .transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Portfolio>> {
        sqlx::query_as::<_, PortfolioRow>("SELECT * FROM portfolios WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .map(Portfolio::try_from)
            .transpose()
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Portfolio>> {
        let rows = sqlx::query_as::<_, PortfolioRow>(
            "SELECT * FROM portfolios WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        into_portfolios(rows)
    }

    async fn update(&self, p: &Portfolio) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE portfolios SET
                slug = $2, template_id = $3, name = $4, title = $5, about = $6,
                email = $7, phone = $8, location = $9, linkedin = $10, github = $11,
                website = $12, profile_picture_url = $13, cv_url = $14,
                skills = $15, experience = $16, education = $17, projects = $18,
                updated_at = $19
            WHERE id = $1
            "#,
        )
        .bind(p.id)
        .bind(&p.slug)
        .bind(p.template_id.as_str())
        .bind(&p.name)
        .bind(&p.title)
        .bind(&p.about)
        .bind(&p.email)
        .bind(&p.phone)
        .bind(&p.location)
        .bind(&p.linkedin)
        .bind(&p.github)
        .bind(&p.website)
        .bind(&p.profile_picture_url)
        .bind(&p.cv_url)
        .bind(Json(&p.skills))
        .bind(Json(&p.experience))
        .bind(Json(&p.education))
        .bind(Json(&p.projects))
        .bind(p.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| slug_conflict(e, p))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_payment_status(&self, id: Uuid, status: PaymentStatus) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE portfolios SET payment_status = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM portfolios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
