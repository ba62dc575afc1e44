use thiserror::Error;

use crate::client::{CacheInvalidator, HardRollbackRequest, HistoryStore, SoftRestoreRequest};
use crate::domain::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    #[error("version {0} not found in loaded history")]
    VersionNotFound(u32),
    #[error("deleting newer versions failed: {0}")]
    HardRollback(String),
    #[error("{0}")]
    SoftRestore(String),
    #[error("version {0} is already the latest version")]
    AlreadyLatest(u32),
    #[error("a restore is already running")]
    Busy,
    #[error("no restore dialog is open")]
    NotOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestoreStrategy {
    #[default]
    Soft,
    Hard,
}

impl RestoreStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Soft => "Soft restore",
            Self::Hard => "Hard rollback",
        }
    }

    /// Name used to prefix failure notifications.
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::Soft => "restore",
            Self::Hard => "rollback",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Soft => Self::Hard,
            Self::Hard => Self::Soft,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreIntent {
    pub target_version: u32,
    pub strategy: RestoreStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RestoreDialog {
    #[default]
    Closed,
    Open {
        intent: RestoreIntent,
        last_error: Option<String>,
    },
    Executing {
        intent: RestoreIntent,
    },
}

/// Sink for user-facing notifications.
pub trait Notifier {
    fn success(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOperation {
    Soft(SoftRestoreRequest),
    Hard(HardRollbackRequest),
}

/// A confirmed intent resolved against the loaded history.
#[derive(Debug, Clone, PartialEq)]
pub struct RestorePlan {
    pub intent: RestoreIntent,
    pub operation: RestoreOperation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    pub intent: RestoreIntent,
    pub deleted_count: Option<u64>,
}

impl RestoreReport {
    pub fn message(&self) -> String {
        let version = self.intent.target_version;
        match self.deleted_count {
            Some(deleted) => format!(
                "Rolled back to version {}, {} newer versions deleted",
                version, deleted
            ),
            None => format!("Restored to version {}", version),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Dialog closed; the history panel should close too.
    Restored(RestoreReport),
    /// Dialog stays open with the error.
    Failed,
    /// Nothing to confirm, or a restore is already running.
    Ignored,
}

/// Restore dialog state for one entity's history panel.
pub struct RestoreOrchestrator {
    entity: EntityRef,
    dialog: RestoreDialog,
}

impl RestoreOrchestrator {
    pub fn new(entity: EntityRef) -> Self {
        Self {
            entity,
            dialog: RestoreDialog::Closed,
        }
    }

    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    pub fn dialog(&self) -> &RestoreDialog {
        &self.dialog
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.dialog, RestoreDialog::Closed)
    }

    pub fn is_executing(&self) -> bool {
        matches!(self.dialog, RestoreDialog::Executing { .. })
    }

    pub fn intent(&self) -> Option<RestoreIntent> {
        match self.dialog {
            RestoreDialog::Closed => None,
            RestoreDialog::Open { intent, .. } | RestoreDialog::Executing { intent } => Some(intent),
        }
    }

    /// Opens the dialog for `version` with the soft strategy.
    pub fn handle_restore(
        &mut self,
        version: u32,
        history: &[HistoryEntry],
    ) -> Result<(), RestoreError> {
        if self.is_executing() {
            return Err(RestoreError::Busy);
        }
        if latest_version(history) == Some(version) {
            return Err(RestoreError::AlreadyLatest(version));
        }
        self.dialog = RestoreDialog::Open {
            intent: RestoreIntent {
                target_version: version,
                strategy: RestoreStrategy::default(),
            },
            last_error: None,
        };
        Ok(())
    }

    pub fn set_strategy(&mut self, strategy: RestoreStrategy) {
        if let RestoreDialog::Open { ref mut intent, .. } = self.dialog {
            intent.strategy = strategy;
        }
    }

    pub fn toggle_strategy(&mut self) {
        if let Some(intent) = self.intent() {
            self.set_strategy(intent.strategy.toggled());
        }
    }

    /// Discards the pending intent. Refused while a restore is running.
    pub fn close_restore_dialog(&mut self) -> bool {
        if self.is_executing() {
            return false;
        }
        self.dialog = RestoreDialog::Closed;
        true
    }

    /// Resolves the open intent into a plan and marks the dialog busy.
    pub fn begin_confirm(&mut self, history: &[HistoryEntry]) -> Result<RestorePlan, RestoreError> {
        let intent = match self.dialog {
            RestoreDialog::Closed => return Err(RestoreError::NotOpen),
            RestoreDialog::Executing { .. } => return Err(RestoreError::Busy),
            RestoreDialog::Open { intent, .. } => intent,
        };
        let entry = find_version(history, intent.target_version)
            .ok_or(RestoreError::VersionNotFound(intent.target_version))?;

        let operation = match intent.strategy {
            RestoreStrategy::Soft => RestoreOperation::Soft(SoftRestoreRequest {
                entity_table: self.entity.table,
                entity_id: self.entity.id.clone(),
                restore_data: entry.restore_payload(),
            }),
            RestoreStrategy::Hard => RestoreOperation::Hard(HardRollbackRequest {
                entity_table: self.entity.table,
                entity_id: self.entity.id.clone(),
                target_version: intent.target_version,
            }),
        };
        self.dialog = RestoreDialog::Executing { intent };
        Ok(RestorePlan { intent, operation })
    }

    /// Applies the result of a confirm: notify, then close or reopen.
    pub fn finish(
        &mut self,
        result: Result<RestoreReport, RestoreError>,
        notifier: &mut dyn Notifier,
    ) -> ConfirmOutcome {
        let Some(intent) = self.intent() else {
            return ConfirmOutcome::Ignored;
        };
        match result {
            Ok(report) => {
                tracing::info!(
                    entity = %self.entity,
                    version = intent.target_version,
                    strategy = intent.strategy.action_name(),
                    "restore completed"
                );
                notifier.success(&report.message());
                self.dialog = RestoreDialog::Closed;
                ConfirmOutcome::Restored(report)
            }
            Err(e) => {
                let message = format!("{} failed: {}", intent.strategy.action_name(), e);
                tracing::error!(entity = %self.entity, "{}", message);
                notifier.error(&message);
                self.dialog = RestoreDialog::Open {
                    intent,
                    last_error: Some(message),
                };
                ConfirmOutcome::Failed
            }
        }
    }

    /// Confirms the open intent against the collaborators in one call.
    pub async fn handle_restore_confirm(
        &mut self,
        history: &[HistoryEntry],
        store: &dyn HistoryStore,
        cache: &dyn CacheInvalidator,
        notifier: &mut dyn Notifier,
    ) -> ConfirmOutcome {
        let result = match self.begin_confirm(history) {
            Ok(plan) => execute(plan, store, cache).await,
            Err(RestoreError::NotOpen | RestoreError::Busy) => return ConfirmOutcome::Ignored,
            Err(e) => Err(e),
        };
        self.finish(result, notifier)
    }
}

/// Runs the write, then a best-effort cache invalidation.
pub async fn execute(
    plan: RestorePlan,
    store: &dyn HistoryStore,
    cache: &dyn CacheInvalidator,
) -> Result<RestoreReport, RestoreError> {
    let deleted_count = match plan.operation {
        RestoreOperation::Soft(request) => {
            store
                .soft_restore_entity(request)
                .await
                .map_err(|e| RestoreError::SoftRestore(e.to_string()))?;
            None
        }
        RestoreOperation::Hard(request) => {
            let response = store
                .hard_rollback_entity(request)
                .await
                .map_err(|e| RestoreError::HardRollback(e.to_string()))?;
            Some(response.deleted_count)
        }
    };

    if let Err(e) = cache.invalidate_all().await {
        tracing::warn!("ignoring failed cache invalidation after restore: {}", e);
    }

    Ok(RestoreReport {
        intent: plan.intent,
        deleted_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{
        CacheError, ClientError, ClientResult, HardRollbackResponse,
    };
    use crate::domain::history::fixtures::{data, entry, item_history};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeStore {
        history: Mutex<Vec<HistoryEntry>>,
        soft_calls: Mutex<Vec<SoftRestoreRequest>>,
        hard_calls: Mutex<Vec<HardRollbackRequest>>,
        rollback_error: Option<String>,
        write_error: Option<String>,
    }

    impl FakeStore {
        fn with_history(history: Vec<HistoryEntry>) -> Self {
            Self {
                history: Mutex::new(history),
                ..Default::default()
            }
        }

        fn call_count(&self) -> usize {
            self.soft_calls.lock().unwrap().len() + self.hard_calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HistoryStore for FakeStore {
        async fn list_entities(&self, _table: EntityTable) -> ClientResult<Vec<EntitySummary>> {
            Ok(vec![])
        }

        async fn fetch_history(
            &self,
            _table: EntityTable,
            _entity_id: &str,
        ) -> ClientResult<Vec<HistoryEntry>> {
            Ok(self.history.lock().unwrap().clone())
        }

        async fn soft_restore_entity(
            &self,
            request: SoftRestoreRequest,
        ) -> ClientResult<serde_json::Value> {
            if let Some(ref message) = self.write_error {
                return Err(ClientError::RequestFailed(message.clone()));
            }
            // Trigger behaviour: every write appends the next version.
            let mut history = self.history.lock().unwrap();
            let next = latest_version(&history).unwrap_or(0) + 1;
            history.push(entry(
                next,
                ActionType::Update,
                serde_json::Value::Object(request.restore_data.clone()),
            ));
            self.soft_calls.lock().unwrap().push(request.clone());
            Ok(serde_json::Value::Object(request.restore_data))
        }

        async fn hard_rollback_entity(
            &self,
            request: HardRollbackRequest,
        ) -> ClientResult<HardRollbackResponse> {
            self.hard_calls.lock().unwrap().push(request.clone());
            if let Some(ref message) = self.rollback_error {
                return Err(ClientError::RequestFailed(message.clone()));
            }
            let mut history = self.history.lock().unwrap();
            let before = history.len();
            history.retain(|e| e.version_number <= request.target_version);
            Ok(HardRollbackResponse {
                deleted_count: (before - history.len()) as u64,
            })
        }
    }

    struct Cache {
        fail: bool,
        calls: Mutex<usize>,
    }

    impl Cache {
        fn ok() -> Self {
            Self {
                fail: false,
                calls: Mutex::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl CacheInvalidator for Cache {
        async fn invalidate_all(&self) -> Result<(), CacheError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                Err(CacheError::Invalidation("network down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct Notes {
        successes: Vec<String>,
        errors: Vec<String>,
    }

    impl Notifier for Notes {
        fn success(&mut self, message: &str) {
            self.successes.push(message.to_string());
        }

        fn error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    fn orchestrator() -> RestoreOrchestrator {
        RestoreOrchestrator::new(EntityRef::new(EntityTable::Items, "item-1"))
    }

    #[test]
    fn latest_version_cannot_be_restored() {
        let history = item_history();
        let mut restore = orchestrator();
        assert_eq!(
            restore.handle_restore(3, &history),
            Err(RestoreError::AlreadyLatest(3))
        );
        assert!(!restore.is_open());
    }

    #[test]
    fn strategy_defaults_to_soft_on_every_open() {
        let history = item_history();
        let mut restore = orchestrator();
        restore.handle_restore(1, &history).unwrap();
        restore.toggle_strategy();
        assert_eq!(restore.intent().unwrap().strategy, RestoreStrategy::Hard);

        assert!(restore.close_restore_dialog());
        restore.handle_restore(2, &history).unwrap();
        assert_eq!(
            restore.intent(),
            Some(RestoreIntent {
                target_version: 2,
                strategy: RestoreStrategy::Soft,
            })
        );
    }

    #[test]
    fn executing_blocks_cancel_and_reconfirm() {
        let history = item_history();
        let mut restore = orchestrator();
        restore.handle_restore(1, &history).unwrap();
        restore.begin_confirm(&history).unwrap();

        assert!(restore.is_executing());
        assert!(!restore.close_restore_dialog());
        assert_eq!(restore.begin_confirm(&history), Err(RestoreError::Busy));
        restore.set_strategy(RestoreStrategy::Hard);
        assert_eq!(restore.intent().unwrap().strategy, RestoreStrategy::Soft);
    }

    #[test]
    fn soft_plan_strips_metadata() {
        let history = vec![
            entry(
                1,
                ActionType::Insert,
                json!({"id": "x", "created_at": "t1", "updated_at": "t2", "name": "A", "code": "B"}),
            ),
            entry(2, ActionType::Update, json!({"id": "x", "name": "C", "code": "B"})),
        ];
        let mut restore = orchestrator();
        restore.handle_restore(1, &history).unwrap();
        let plan = restore.begin_confirm(&history).unwrap();
        match plan.operation {
            RestoreOperation::Soft(request) => {
                assert_eq!(request.restore_data, data(json!({"name": "A", "code": "B"})));
            }
            other => panic!("expected soft restore, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_version_never_calls_store() {
        let history = item_history();
        let mut restore = orchestrator();
        restore.handle_restore(7, &history).unwrap();

        let store = FakeStore::with_history(history.clone());
        let cache = Cache::ok();
        let mut notes = Notes::default();
        let outcome = restore
            .handle_restore_confirm(&history, &store, &cache, &mut notes)
            .await;

        assert_eq!(outcome, ConfirmOutcome::Failed);
        assert_eq!(store.call_count(), 0);
        assert_eq!(notes.errors.len(), 1);
        assert!(notes.errors[0].contains("not found"));
        assert!(notes.errors[0].starts_with("restore failed"));
        assert!(restore.is_open());
    }

    #[tokio::test]
    async fn hard_rollback_reports_count_and_target() {
        let mut history = item_history();
        history.push(entry(4, ActionType::Update, json!({"name": "v4"})));
        history.push(entry(5, ActionType::Update, json!({"name": "v5"})));
        let store = FakeStore::with_history(history.clone());
        let cache = Cache::ok();
        let mut notes = Notes::default();

        let mut restore = orchestrator();
        restore.handle_restore(2, &history).unwrap();
        restore.set_strategy(RestoreStrategy::Hard);
        let outcome = restore
            .handle_restore_confirm(&history, &store, &cache, &mut notes)
            .await;

        let ConfirmOutcome::Restored(report) = outcome else {
            panic!("expected success, got {:?}", outcome);
        };
        assert_eq!(report.deleted_count, Some(3));
        assert!(notes.successes[0].contains('3'));
        assert!(notes.successes[0].contains('2'));
        assert!(store.soft_calls.lock().unwrap().is_empty());
        assert_eq!(*cache.calls.lock().unwrap(), 1);
        assert!(!restore.is_open());
    }

    #[tokio::test]
    async fn hard_rollback_failure_keeps_dialog_open() {
        let history = item_history();
        let store = FakeStore {
            rollback_error: Some("permission denied".to_string()),
            ..FakeStore::with_history(history.clone())
        };
        let cache = Cache::ok();
        let mut notes = Notes::default();

        let mut restore = orchestrator();
        restore.handle_restore(1, &history).unwrap();
        restore.set_strategy(RestoreStrategy::Hard);
        let outcome = restore
            .handle_restore_confirm(&history, &store, &cache, &mut notes)
            .await;

        assert_eq!(outcome, ConfirmOutcome::Failed);
        assert_eq!(notes.errors.len(), 1);
        assert!(notes.errors[0].starts_with("rollback failed: deleting newer versions failed"));
        assert!(notes.errors[0].contains("permission denied"));
        assert_eq!(*cache.calls.lock().unwrap(), 0);
        match restore.dialog() {
            RestoreDialog::Open { intent, last_error } => {
                assert_eq!(intent.strategy, RestoreStrategy::Hard);
                assert!(last_error.is_some());
            }
            other => panic!("dialog should stay open, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn soft_write_error_passes_message_through() {
        let history = item_history();
        let store = FakeStore {
            write_error: Some("duplicate code".to_string()),
            ..FakeStore::with_history(history.clone())
        };
        let mut notes = Notes::default();
        let mut restore = orchestrator();
        restore.handle_restore(1, &history).unwrap();
        restore
            .handle_restore_confirm(&history, &store, &Cache::ok(), &mut notes)
            .await;
        assert_eq!(notes.errors.len(), 1);
        assert!(notes.errors[0].contains("duplicate code"));
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_invalidation_is_not_a_failure() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _log_guard = tracing::subscriber::set_default(subscriber);

        let history = item_history();
        let store = FakeStore::with_history(history.clone());
        let cache = Cache::failing();
        let mut notes = Notes::default();

        let mut restore = orchestrator();
        restore.handle_restore(1, &history).unwrap();
        let outcome = restore
            .handle_restore_confirm(&history, &store, &cache, &mut notes)
            .await;

        assert!(matches!(outcome, ConfirmOutcome::Restored(_)));
        assert!(notes.errors.is_empty());
        assert_eq!(notes.successes.len(), 1);
        assert_eq!(*cache.calls.lock().unwrap(), 1);
        assert!(!restore.is_open());

        let output = logs.contents();
        assert!(output.contains("WARN"));
        assert!(output.contains("ignoring failed cache invalidation after restore"));
        assert!(output.contains("network down"));
    }

    #[tokio::test]
    async fn confirm_without_dialog_is_ignored() {
        let history = item_history();
        let store = FakeStore::with_history(history.clone());
        let mut notes = Notes::default();
        let mut restore = orchestrator();
        let outcome = restore
            .handle_restore_confirm(&history, &store, &Cache::ok(), &mut notes)
            .await;
        assert_eq!(outcome, ConfirmOutcome::Ignored);
        assert!(notes.errors.is_empty());
    }

    #[tokio::test]
    async fn soft_restore_appends_version_through_store() {
        let history = item_history();
        let store = FakeStore::with_history(history.clone());
        let mut notes = Notes::default();
        let mut restore = orchestrator();
        restore.handle_restore(2, &history).unwrap();
        restore
            .handle_restore_confirm(&history, &store, &Cache::ok(), &mut notes)
            .await;

        let reloaded = store
            .fetch_history(EntityTable::Items, "item-1")
            .await
            .unwrap();
        assert_eq!(latest_version(&reloaded), Some(4));
        assert_eq!(reloaded[3].restore_payload(), history[1].restore_payload());
        assert_eq!(history, reloaded[..3].to_vec());
    }
}
