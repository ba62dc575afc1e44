use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{
    ClientError, ClientResult, HardRollbackRequest, HardRollbackResponse, HistoryStore,
    SoftRestoreRequest,
};
use crate::domain::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntity {
    pub table: EntityTable,
    pub id: String,
    pub current: EntityData,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl StoredEntity {
    fn latest(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    /// Appends a history row for a write, the way an audit trigger would.
    fn record(&mut self, action: ActionType, user_name: Option<&str>, at: DateTime<Utc>) {
        let version_number = self.latest().map_or(1, |last| last.version_number + 1);
        let changed_at = self
            .latest()
            .map_or(at, |last| last.changed_at.max(at));
        let changed_fields = match (action, self.latest()) {
            (ActionType::Insert, _) | (_, None) => None,
            (_, Some(previous)) => Some(changed_fields(&previous.entity_data, &self.current)),
        };
        self.history.push(HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            version_number,
            action_type: action,
            changed_at,
            entity_data: self.current.clone(),
            changed_fields,
            user_name: user_name.map(str::to_string),
        });
    }

    fn summary(&self) -> EntitySummary {
        EntitySummary {
            table: self.table,
            id: self.id.clone(),
            code: text_field(&self.current, "code"),
            name: text_field(&self.current, "name"),
            version_count: self.history.len(),
            updated_at: self.latest().map(|entry| entry.changed_at),
        }
    }
}

fn text_field(data: &EntityData, key: &str) -> String {
    match data.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub entities: Vec<StoredEntity>,
}

impl Dataset {
    fn find_mut(&mut self, table: EntityTable, id: &str) -> ClientResult<&mut StoredEntity> {
        self.entities
            .iter_mut()
            .find(|entity| entity.table == table && entity.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("{}/{}", table, id)))
    }

    fn find(&self, table: EntityTable, id: &str) -> ClientResult<&StoredEntity> {
        self.entities
            .iter()
            .find(|entity| entity.table == table && entity.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("{}/{}", table, id)))
    }

    /// Inserts a new row and its initial history entry.
    pub fn insert(
        &mut self,
        table: EntityTable,
        id: &str,
        mut data: EntityData,
        user_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> ClientResult<()> {
        if self.find(table, id).is_ok() {
            return Err(ClientError::Conflict(format!("{}/{} already exists", table, id)));
        }
        let stamp = serde_json::Value::String(at.to_rfc3339());
        data.insert("id".to_string(), serde_json::Value::String(id.to_string()));
        data.insert("created_at".to_string(), stamp.clone());
        data.insert("updated_at".to_string(), stamp);
        let mut entity = StoredEntity {
            table,
            id: id.to_string(),
            current: data,
            history: vec![],
        };
        entity.record(ActionType::Insert, user_name, at);
        self.entities.push(entity);
        Ok(())
    }

    /// Merges `changes` into the current row and records an UPDATE.
    pub fn update(
        &mut self,
        table: EntityTable,
        id: &str,
        changes: EntityData,
        user_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> ClientResult<EntityData> {
        let entity = self.find_mut(table, id)?;
        for (key, value) in changes {
            if METADATA_FIELDS.contains(&key.as_str()) {
                continue;
            }
            entity.current.insert(key, value);
        }
        entity.current.insert(
            "updated_at".to_string(),
            serde_json::Value::String(at.to_rfc3339()),
        );
        entity.record(ActionType::Update, user_name, at);
        Ok(entity.current.clone())
    }

    fn rollback(&mut self, table: EntityTable, id: &str, target_version: u32) -> ClientResult<u64> {
        let entity = self.find_mut(table, id)?;
        let target = find_version(&entity.history, target_version)
            .cloned()
            .ok_or_else(|| {
                ClientError::NotFound(format!("version {} of {}/{}", target_version, table, id))
            })?;
        let before = entity.history.len();
        entity
            .history
            .retain(|entry| entry.version_number <= target_version);
        entity.current = target.entity_data;
        Ok((before - entity.history.len()) as u64)
    }
}

/// In-process [`HistoryStore`], optionally mirrored to a JSON file.
///
/// Writes land on a copy of the dataset that replaces the live one only
/// after the file save succeeds.
pub struct MemoryStore {
    data: Mutex<Dataset>,
    path: Option<PathBuf>,
    user_name: Option<String>,
}

impl MemoryStore {
    pub fn new(dataset: Dataset, user_name: Option<String>) -> Self {
        Self {
            data: Mutex::new(dataset),
            path: None,
            user_name,
        }
    }

    pub fn demo(user_name: Option<String>) -> Self {
        Self::new(super::seed::demo_dataset(), user_name)
    }

    /// Loads a dataset from `path`, seeding demo data if the file is missing.
    pub async fn open(path: &Path, user_name: Option<String>) -> ClientResult<Self> {
        let dataset = match tokio::fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| ClientError::Storage(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("{} not found, starting from demo data", path.display());
                super::seed::demo_dataset()
            }
            Err(e) => return Err(ClientError::Storage(format!("{}: {}", path.display(), e))),
        };
        Ok(Self {
            data: Mutex::new(dataset),
            path: Some(path.to_path_buf()),
            user_name,
        })
    }

    async fn persist(&self, data: &Dataset) -> ClientResult<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| ClientError::Storage(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn list_entities(&self, table: EntityTable) -> ClientResult<Vec<EntitySummary>> {
        let data = self.data.lock().await;
        let mut rows: Vec<EntitySummary> = data
            .entities
            .iter()
            .filter(|entity| entity.table == table)
            .map(StoredEntity::summary)
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn fetch_history(
        &self,
        table: EntityTable,
        entity_id: &str,
    ) -> ClientResult<Vec<HistoryEntry>> {
        let data = self.data.lock().await;
        Ok(data.find(table, entity_id)?.history.clone())
    }

    async fn soft_restore_entity(
        &self,
        request: SoftRestoreRequest,
    ) -> ClientResult<serde_json::Value> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let row = next.update(
            request.entity_table,
            &request.entity_id,
            request.restore_data,
            self.user_name.as_deref(),
            Utc::now(),
        )?;
        self.persist(&next).await?;
        *data = next;
        tracing::info!(
            table = %request.entity_table,
            id = %request.entity_id,
            "soft restore written"
        );
        Ok(serde_json::Value::Object(row))
    }

    async fn hard_rollback_entity(
        &self,
        request: HardRollbackRequest,
    ) -> ClientResult<HardRollbackResponse> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let deleted_count = next.rollback(
            request.entity_table,
            &request.entity_id,
            request.target_version,
        )?;
        self.persist(&next).await?;
        *data = next;
        tracing::info!(
            table = %request.entity_table,
            id = %request.entity_id,
            target = request.target_version,
            deleted_count,
            "hard rollback applied"
        );
        Ok(HardRollbackResponse { deleted_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::fixtures::data;
    use serde_json::json;

    async fn store_with_three_versions() -> MemoryStore {
        let mut dataset = Dataset::default();
        let now = Utc::now();
        dataset
            .insert(
                EntityTable::Items,
                "item-1",
                data(json!({"name": "Amoxicillin", "code": "AMX"})),
                Some("seed"),
                now,
            )
            .unwrap();
        dataset
            .update(EntityTable::Items, "item-1", data(json!({"name": "Amoxicillin 500"})), None, now)
            .unwrap();
        dataset
            .update(EntityTable::Items, "item-1", data(json!({"code": "AMX-500"})), None, now)
            .unwrap();
        MemoryStore::new(dataset, Some("tester".to_string()))
    }

    #[tokio::test]
    async fn writes_append_history_rows() {
        let store = store_with_three_versions().await;
        let history = store.fetch_history(EntityTable::Items, "item-1").await.unwrap();
        let versions: Vec<u32> = history.iter().map(|e| e.version_number).collect();
        assert_eq!(versions, vec![1, 2, 3]);
        assert!(history[0].changed_fields.is_none());
        let changes = history[2].changed_fields.as_ref().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["code"].from, json!("AMX"));
    }

    #[tokio::test]
    async fn soft_restore_creates_new_latest_version() {
        let store = store_with_three_versions().await;
        let history = store.fetch_history(EntityTable::Items, "item-1").await.unwrap();

        let row = store
            .soft_restore_entity(SoftRestoreRequest {
                entity_table: EntityTable::Items,
                entity_id: "item-1".to_string(),
                restore_data: history[0].restore_payload(),
            })
            .await
            .unwrap();

        assert_eq!(row["name"], json!("Amoxicillin"));
        assert_eq!(row["id"], json!("item-1"));
        let history = store.fetch_history(EntityTable::Items, "item-1").await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[3].action_type, ActionType::Update);
        assert_eq!(history[3].user_name.as_deref(), Some("tester"));
    }

    #[tokio::test]
    async fn hard_rollback_deletes_newer_versions() {
        let store = store_with_three_versions().await;
        let response = store
            .hard_rollback_entity(HardRollbackRequest {
                entity_table: EntityTable::Items,
                entity_id: "item-1".to_string(),
                target_version: 1,
            })
            .await
            .unwrap();

        assert_eq!(response.deleted_count, 2);
        let summaries = store.list_entities(EntityTable::Items).await.unwrap();
        assert_eq!(summaries[0].name, "Amoxicillin");
        assert_eq!(summaries[0].version_count, 1);
    }

    #[tokio::test]
    async fn hard_rollback_to_unknown_version_fails() {
        let store = store_with_three_versions().await;
        let err = store
            .hard_rollback_entity(HardRollbackRequest {
                entity_table: EntityTable::Items,
                entity_id: "item-1".to_string(),
                target_version: 9,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    fn unwritable(store: MemoryStore) -> MemoryStore {
        let path = std::env::temp_dir()
            .join(format!("apohist-missing-{}", uuid::Uuid::new_v4()))
            .join("data.json");
        MemoryStore {
            path: Some(path),
            ..store
        }
    }

    #[tokio::test]
    async fn failed_save_leaves_soft_restore_unapplied() {
        let store = unwritable(store_with_three_versions().await);
        let history = store.fetch_history(EntityTable::Items, "item-1").await.unwrap();

        let err = store
            .soft_restore_entity(SoftRestoreRequest {
                entity_table: EntityTable::Items,
                entity_id: "item-1".to_string(),
                restore_data: history[0].restore_payload(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Storage(_)));
        let after = store.fetch_history(EntityTable::Items, "item-1").await.unwrap();
        assert_eq!(after.len(), 3);
        let summaries = store.list_entities(EntityTable::Items).await.unwrap();
        assert_eq!(summaries[0].name, "Amoxicillin 500");
    }

    #[tokio::test]
    async fn failed_save_leaves_hard_rollback_unapplied() {
        let store = unwritable(store_with_three_versions().await);

        let err = store
            .hard_rollback_entity(HardRollbackRequest {
                entity_table: EntityTable::Items,
                entity_id: "item-1".to_string(),
                target_version: 1,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Storage(_)));
        let after = store.fetch_history(EntityTable::Items, "item-1").await.unwrap();
        let versions: Vec<u32> = after.iter().map(|e| e.version_number).collect();
        assert_eq!(versions, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let mut dataset = Dataset::default();
        let now = Utc::now();
        dataset
            .insert(EntityTable::Suppliers, "s-1", EntityData::new(), None, now)
            .unwrap();
        let err = dataset
            .insert(EntityTable::Suppliers, "s-1", EntityData::new(), None, now)
            .unwrap_err();
        assert!(matches!(err, ClientError::Conflict(_)));
    }
}
