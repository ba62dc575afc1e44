use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::*;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq)]
pub struct SoftRestoreRequest {
    pub entity_table: EntityTable,
    pub entity_id: String,
    pub restore_data: EntityData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardRollbackRequest {
    pub entity_table: EntityTable,
    pub entity_id: String,
    pub target_version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardRollbackResponse {
    pub deleted_count: u64,
}

/// Persistence collaborator for versioned entities.
///
/// Writes made through `soft_restore_entity` append a new history row on
/// the store side; callers never construct history entries themselves.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn list_entities(&self, table: EntityTable) -> ClientResult<Vec<EntitySummary>>;

    /// Rows ordered by ascending version number.
    async fn fetch_history(
        &self,
        table: EntityTable,
        entity_id: &str,
    ) -> ClientResult<Vec<HistoryEntry>>;

    /// Writes `restore_data` as the current row and returns it.
    async fn soft_restore_entity(
        &self,
        request: SoftRestoreRequest,
    ) -> ClientResult<serde_json::Value>;

    /// Deletes every history row newer than `target_version`.
    async fn hard_rollback_entity(
        &self,
        request: HardRollbackRequest,
    ) -> ClientResult<HardRollbackResponse>;
}
