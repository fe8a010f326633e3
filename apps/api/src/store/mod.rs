//! Portfolio document persistence.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{PaymentStatus, Portfolio};

pub use postgres::PgPortfolioStore;

/// Raised by a write that would break slug uniqueness. Surfaces as 409.
#[derive(Debug, Error)]
#[error("Slug '{0}' is already taken")]
pub struct SlugTaken(pub String);

/// Document store for portfolios. `id` is the primary key, `slug` a unique
/// alternate key. Implementations must reject a duplicate slug on write.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn insert(&self, portfolio: &Portfolio) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Portfolio>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Portfolio>>;

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Portfolio>>;

    /// Replaces the editable columns of an existing document. Returns false if absent.
    /// `payment_status` is left untouched; only `set_payment_status` writes it.
    async fn update(&self, portfolio: &Portfolio) -> Result<bool>;

    async fn set_payment_status(&self, id: Uuid, status: PaymentStatus) -> Result<bool>;

    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Resolves a viewer key: a UUID is looked up by id first, anything else by slug.
pub async fn find_by_key(store: &dyn PortfolioStore, key: &str) -> Result<Option<Portfolio>> {
    if let Ok(id) = key.parse::<Uuid>() {
        if let Some(portfolio) = store.get(id).await? {
            return Ok(Some(portfolio));
        }
    }
    store.find_by_slug(key).await
}
