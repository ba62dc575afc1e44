//! Version history selection and restore.

pub mod keyboard;
pub mod restore;
pub mod selection;

pub use keyboard::{FocusTarget, KeyInput, KeyboardNavigation, NavigationTarget};
pub use restore::{
    ConfirmOutcome, Notifier, RestoreDialog, RestoreError, RestoreIntent, RestoreOrchestrator,
    RestorePlan, RestoreReport, RestoreStrategy,
};
pub use selection::{
    HistorySelection, IgnoreSelection, SelectionEvent, SelectionListener, SelectionMode,
    SelectionPhase,
};
