//! Object storage for uploaded portfolio assets (profile pictures, CVs, project images).

pub mod s3;

#[cfg(test)]
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

pub use s3::S3AssetStorage;

#[async_trait]
pub trait AssetStorage: Send + Sync {
    /// Stores `body` under `key` and returns its public URL.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String>;

    /// Deletes every object under `prefix`. Returns the number removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize>;
}

/// Where an uploaded file belongs within a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSlot {
    ProfilePicture,
    Cv,
    Project(usize),
}

impl AssetSlot {
    fn segment(&self) -> String {
        match self {
            AssetSlot::ProfilePicture => "profile".to_string(),
            AssetSlot::Cv => "cv".to_string(),
            AssetSlot::Project(i) => format!("projects/{i}"),
        }
    }

    pub fn label(&self) -> String {
        match self {
            AssetSlot::ProfilePicture => "profile picture".to_string(),
            AssetSlot::Cv => "CV".to_string(),
            AssetSlot::Project(i) => format!("project {} image", i + 1),
        }
    }
}

/// `users/{userId}/portfolios/{portfolioId}/`
pub fn portfolio_prefix(owner_id: &str, portfolio_id: Uuid) -> String {
    format!("users/{owner_id}/portfolios/{portfolio_id}/")
}

/// `users/{userId}/portfolios/{portfolioId}/{profile|cv|projects/{i}}/{filename}`
pub fn asset_key(owner_id: &str, portfolio_id: Uuid, slot: AssetSlot, filename: &str) -> String {
    format!(
        "{}{}/{}",
        portfolio_prefix(owner_id, portfolio_id),
        slot.segment(),
        sanitize_filename(filename)
    )
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}
