use crossterm::event::KeyCode;

use crate::domain::*;
use crate::history::{RestoreError, RestoreReport, RestoreStrategy, SelectionMode};

#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    NavigateUp,
    NavigateDown,
    NavigateTop,
    NavigateBottom,
    Select,
    Back,

    // Vim chord
    EnterPendingG,

    // History panel
    HistoryKey(KeyCode),
    ClickVersion,
    ToggleCompareMode,
    SetSelectionMode(SelectionMode),
    ClearSelection,
    OpenRestore,

    // Restore dialog
    ToggleStrategy,
    SetStrategy(RestoreStrategy),
    ConfirmRestore,
    CancelRestore,

    // Tables
    SwitchTable(EntityTable),
    NextTable,
    PrevTable,

    // UI
    OpenCommandInput,
    OpenSearch,
    CloseOverlay,
    SubmitCommandInput(String),
    SubmitSearch(String),
    UpdateInputBuffer(String),
    ToggleHelp,

    // Data responses
    EntitiesLoaded(EntityTable, Vec<EntitySummary>),
    HistoryLoaded(EntityRef, Vec<HistoryEntry>),
    RestoreFinished(EntityRef, Result<RestoreReport, RestoreError>),

    // App control
    Refresh,
    Quit,
    Tick,
    Error(String),
    ClearError,
}
