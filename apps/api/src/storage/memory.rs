use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use bytes::Bytes;

use crate::storage::AssetStorage;

/// In-process storage for handler tests. Keys containing any of `failing`
/// fragments are rejected, to exercise partial-upload paths.
#[derive(Default)]
pub struct MemoryAssetStorage {
    pub objects: Mutex<BTreeMap<String, Bytes>>,
    pub failing: HashSet<String>,
}

impl MemoryAssetStorage {
    pub fn failing_on(fragment: &str) -> Self {
        MemoryAssetStorage {
            failing: HashSet::from([fragment.to_string()]),
            ..Default::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl AssetStorage for MemoryAssetStorage {
    async fn put(&self, key: &str, body: Bytes, _content_type: &str) -> Result<String> {
        if self.failing.iter().any(|f| key.contains(f.as_str())) {
            bail!("simulated outage for {key}");
        }
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(format!("https://assets.test/{key}"))
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let mut objects = self.objects.lock().unwrap();
        let before = objects.len();
        objects.retain(|k, _| !k.starts_with(prefix));
        Ok(before - objects.len())
    }
}
