use std::collections::HashMap;

use axum::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Key-value store for per-user cached projections.
///
/// Values are JSON strings. Writes overwrite unconditionally: the cache
/// is a projection of server-held rows, not a source of truth.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn put(&self, key: &str, value: String) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Cache key for a user's dashboard summary.
pub fn dashboard_key(user_id: Uuid) -> String {
    format!("dashboard_data_{}", user_id)
}

/// In-process cache backing [`CacheStore`].
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> anyhow::Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
