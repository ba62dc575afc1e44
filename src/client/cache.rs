use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::*;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache invalidation failed: {0}")]
    Invalidation(String),
}

/// Invalidates every cached read touched by a restore.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate_all(&self) -> Result<(), CacheError>;
}

/// Memoized history feeds and entity lists.
#[derive(Default)]
pub struct QueryCache {
    histories: RwLock<HashMap<EntityRef, Vec<HistoryEntry>>>,
    entities: RwLock<HashMap<EntityTable, Vec<EntitySummary>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn history(&self, key: &EntityRef) -> Option<Vec<HistoryEntry>> {
        self.histories.read().await.get(key).cloned()
    }

    pub async fn store_history(&self, key: EntityRef, entries: Vec<HistoryEntry>) {
        self.histories.write().await.insert(key, entries);
    }

    pub async fn entities(&self, table: EntityTable) -> Option<Vec<EntitySummary>> {
        self.entities.read().await.get(&table).cloned()
    }

    pub async fn store_entities(&self, table: EntityTable, rows: Vec<EntitySummary>) {
        self.entities.write().await.insert(table, rows);
    }

    pub async fn len(&self) -> usize {
        self.histories.read().await.len() + self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheInvalidator for QueryCache {
    async fn invalidate_all(&self) -> Result<(), CacheError> {
        let histories = {
            let mut guard = self.histories.write().await;
            let count = guard.len();
            guard.clear();
            count
        };
        let entities = {
            let mut guard = self.entities.write().await;
            let count = guard.len();
            guard.clear();
            count
        };
        tracing::debug!(histories, entities, "query cache invalidated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalidate_all_clears_both_maps() {
        let cache = QueryCache::new();
        let key = EntityRef::new(EntityTable::Items, "item-1");
        cache.store_history(key.clone(), vec![]).await;
        cache.store_entities(EntityTable::Items, vec![]).await;
        assert_eq!(cache.len().await, 2);

        cache.invalidate_all().await.unwrap();

        assert!(cache.is_empty().await);
        assert!(cache.history(&key).await.is_none());
    }
}
