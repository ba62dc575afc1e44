use std::sync::Arc;

use tokio::sync::mpsc;

use crate::action::Action;
use crate::client::{CacheInvalidator, HistoryStore, QueryCache};
use crate::domain::{EntityRef, EntityTable};
use crate::history::restore::{self, RestorePlan};

#[derive(Debug)]
pub enum StoreRequest {
    LoadEntities(EntityTable),
    LoadHistory(EntityRef),
    Restore { entity: EntityRef, plan: RestorePlan },
    InvalidateCache,
}

#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::UnboundedSender<StoreRequest>,
}

impl StoreHandle {
    pub fn send(&self, request: StoreRequest) {
        let _ = self.tx.send(request);
    }
}

/// Runs store calls off the UI loop, answering with actions.
pub struct StoreWorker {
    store: Arc<dyn HistoryStore>,
    cache: Arc<QueryCache>,
    rx: mpsc::UnboundedReceiver<StoreRequest>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl StoreWorker {
    pub fn new(
        store: Arc<dyn HistoryStore>,
        cache: Arc<QueryCache>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> (Self, StoreHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = StoreHandle { tx };
        let worker = Self {
            store,
            cache,
            rx,
            action_tx,
        };
        (worker, handle)
    }

    pub async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            let Some(action) = self.process(request).await else {
                continue;
            };
            if self.action_tx.send(action).is_err() {
                break;
            }
        }
    }

    async fn process(&self, request: StoreRequest) -> Option<Action> {
        match request {
            StoreRequest::LoadEntities(table) => {
                if let Some(rows) = self.cache.entities(table).await {
                    return Some(Action::EntitiesLoaded(table, rows));
                }
                match self.store.list_entities(table).await {
                    Ok(rows) => {
                        self.cache.store_entities(table, rows.clone()).await;
                        Some(Action::EntitiesLoaded(table, rows))
                    }
                    Err(e) => Some(Action::Error(format!(
                        "failed to load {}: {}",
                        table.label(),
                        e
                    ))),
                }
            }
            StoreRequest::LoadHistory(entity) => {
                if let Some(entries) = self.cache.history(&entity).await {
                    return Some(Action::HistoryLoaded(entity, entries));
                }
                match self.store.fetch_history(entity.table, &entity.id).await {
                    Ok(entries) => {
                        self.cache.store_history(entity.clone(), entries.clone()).await;
                        Some(Action::HistoryLoaded(entity, entries))
                    }
                    Err(e) => Some(Action::Error(format!(
                        "failed to load history for {}: {}",
                        entity, e
                    ))),
                }
            }
            StoreRequest::Restore { entity, plan } => {
                let result = restore::execute(plan, self.store.as_ref(), self.cache.as_ref()).await;
                Some(Action::RestoreFinished(entity, result))
            }
            StoreRequest::InvalidateCache => match self.cache.invalidate_all().await {
                Ok(()) => None,
                Err(e) => Some(Action::Error(format!("failed to clear cache: {}", e))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{HardRollbackRequest, MemoryStore};
    use crate::history::restore::RestoreOperation;
    use crate::history::{RestoreIntent, RestoreStrategy};

    fn worker() -> (StoreWorker, mpsc::UnboundedReceiver<Action>) {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let store: Arc<dyn HistoryStore> = Arc::new(MemoryStore::demo(None));
        let (worker, _handle) = StoreWorker::new(store, Arc::new(QueryCache::new()), action_tx);
        (worker, action_rx)
    }

    #[tokio::test]
    async fn loads_are_cached_until_restore() {
        let (worker, _rx) = worker();
        let entity = EntityRef::new(EntityTable::Items, "itm-0001");

        let Some(Action::HistoryLoaded(_, entries)) =
            worker.process(StoreRequest::LoadHistory(entity.clone())).await
        else {
            panic!("expected history");
        };
        assert_eq!(entries.len(), 4);
        assert!(worker.cache.history(&entity).await.is_some());

        let plan = RestorePlan {
            intent: RestoreIntent {
                target_version: 2,
                strategy: RestoreStrategy::Hard,
            },
            operation: RestoreOperation::Hard(HardRollbackRequest {
                entity_table: EntityTable::Items,
                entity_id: "itm-0001".to_string(),
                target_version: 2,
            }),
        };
        let action = worker
            .process(StoreRequest::Restore {
                entity: entity.clone(),
                plan,
            })
            .await;
        let Some(Action::RestoreFinished(_, Ok(report))) = action else {
            panic!("expected successful restore");
        };
        assert_eq!(report.deleted_count, Some(2));
        assert!(worker.cache.is_empty().await);

        let Some(Action::HistoryLoaded(_, entries)) =
            worker.process(StoreRequest::LoadHistory(entity)).await
        else {
            panic!("expected history");
        };
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn unknown_entity_reports_error() {
        let (worker, _rx) = worker();
        let entity = EntityRef::new(EntityTable::Suppliers, "missing");
        let action = worker.process(StoreRequest::LoadHistory(entity)).await;
        assert!(matches!(action, Some(Action::Error(msg)) if msg.contains("suppliers/missing")));
    }
}
