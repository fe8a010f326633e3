use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{PaymentStatus, Portfolio};
use crate::store::{PortfolioStore, SlugTaken};

/// In-process store used by handler tests. Enforces slug uniqueness like the
/// unique index on `portfolios.slug`.
#[derive(Default)]
pub struct MemoryPortfolioStore {
    docs: Mutex<HashMap<Uuid, Portfolio>>,
}

impl MemoryPortfolioStore {
    fn check_slug(docs: &HashMap<Uuid, Portfolio>, portfolio: &Portfolio) -> Result<()> {
        if let Some(slug) = &portfolio.slug {
            if docs
                .values()
                .any(|d| d.id != portfolio.id && d.slug.as_deref() == Some(slug))
            {
                return Err(SlugTaken(slug.clone()).into());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PortfolioStore for MemoryPortfolioStore {
    async fn insert(&self, portfolio: &Portfolio) -> Result<()> {
        let mut docs = self.docs.lock().unwrap();
        Self::check_slug(&docs, portfolio)?;
        if docs.contains_key(&portfolio.id) {
            bail!("duplicate id {}", portfolio.id);
        }
        docs.insert(portfolio.id, portfolio.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Portfolio>> {
        Ok(self.docs.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Portfolio>> {
        Ok(self
            .docs
            .lock()
            .unwrap()
            .values()
            .find(|d| d.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Portfolio>> {
        let mut docs: Vec<Portfolio> = self
            .docs
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }

    async fn update(&self, portfolio: &Portfolio) -> Result<bool> {
        let mut docs = self.docs.lock().unwrap();
        Self::check_slug(&docs, portfolio)?;
        match docs.get_mut(&portfolio.id) {
            Some(existing) => {
                let payment_status = existing.payment_status;
                *existing = portfolio.clone();
                existing.payment_status = payment_status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_payment_status(&self, id: Uuid, status: PaymentStatus) -> Result<bool> {
        let mut docs = self.docs.lock().unwrap();
        Ok(docs
            .get_mut(&id)
            .map(|d| d.payment_status = status)
            .is_some())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.docs.lock().unwrap().remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PortfolioFields;
    use crate::store::find_by_key;

    fn with_slug(slug: &str) -> Portfolio {
        Portfolio::new(
            "owner",
            PortfolioFields {
                slug: Some(slug.to_string()),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let store = MemoryPortfolioStore::default();
        store.insert(&with_slug("ada")).await.unwrap();
        assert!(store.insert(&with_slug("ada")).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_typed() {
        let store = MemoryPortfolioStore::default();
        store.insert(&with_slug("ada")).await.unwrap();
        let err = store.insert(&with_slug("ada")).await.unwrap_err();
        assert_eq!(err.downcast_ref::<SlugTaken>().map(|e| e.0.as_str()), Some("ada"));
    }

    #[tokio::test]
    async fn test_find_by_key_accepts_id_or_slug() {
        let store = MemoryPortfolioStore::default();
        let p = with_slug("ada");
        store.insert(&p).await.unwrap();

        let by_id = find_by_key(&store, &p.id.to_string()).await.unwrap();
        assert_eq!(by_id.map(|d| d.id), Some(p.id));
        let by_slug = find_by_key(&store, "ada").await.unwrap();
        assert_eq!(by_slug.map(|d| d.id), Some(p.id));
        assert!(find_by_key(&store, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_payment_status() {
        let store = MemoryPortfolioStore::default();
        let p = with_slug("ada");
        store.insert(&p).await.unwrap();
        assert!(store.set_payment_status(p.id, PaymentStatus::Paid).await.unwrap());
        assert!(store.get(p.id).await.unwrap().unwrap().is_paid());
        assert!(!store
            .set_payment_status(Uuid::new_v4(), PaymentStatus::Paid)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_from_stale_copy_keeps_payment() {
        let store = MemoryPortfolioStore::default();
        let p = with_slug("ada");
        store.insert(&p).await.unwrap();

        let mut stale = store.get(p.id).await.unwrap().unwrap();
        store.set_payment_status(p.id, PaymentStatus::Paid).await.unwrap();
        stale.name = "Ada King".to_string();
        assert!(store.update(&stale).await.unwrap());

        let stored = store.get(p.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ada King");
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
    }
}
