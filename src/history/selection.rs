use crate::domain::HistoryEntry;

use super::keyboard::{KeyInput, KeyboardNavigation, NavigationTarget};

pub const DEFAULT_MAX_SELECTIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Single,
    Compare,
}

impl SelectionMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Compare => "compare",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Single => Self::Compare,
            Self::Compare => Self::Single,
        }
    }
}

/// Derived view of the selection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    SingleSelected(u32),
    CompareBuilding(usize),
    CompareReady,
}

/// Receives selection changes. Every method is optional.
pub trait SelectionListener {
    fn on_version_select(&mut self, _entry: &HistoryEntry) {}
    fn on_version_deselect(&mut self) {}
    fn on_compare_select(&mut self, _entries: &[HistoryEntry]) {}
    fn on_selection_empty(&mut self) {}
}

/// Listener that ignores everything.
pub struct IgnoreSelection;

impl SelectionListener for IgnoreSelection {}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    VersionSelected(HistoryEntry),
    VersionDeselected,
    CompareSelected(Vec<HistoryEntry>),
    SelectionEmpty,
}

impl SelectionListener for Vec<SelectionEvent> {
    fn on_version_select(&mut self, entry: &HistoryEntry) {
        self.push(SelectionEvent::VersionSelected(entry.clone()));
    }

    fn on_version_deselect(&mut self) {
        self.push(SelectionEvent::VersionDeselected);
    }

    fn on_compare_select(&mut self, entries: &[HistoryEntry]) {
        self.push(SelectionEvent::CompareSelected(entries.to_vec()));
    }

    fn on_selection_empty(&mut self) {
        self.push(SelectionEvent::SelectionEmpty);
    }
}

/// Single and compare selection over one history list.
///
/// Lives as long as the history panel. Entries are cloned snapshots of the
/// caller's list; the engine never alters them.
pub struct HistorySelection {
    mode: SelectionMode,
    selected_version: Option<u32>,
    compare: Vec<HistoryEntry>,
    max_selections: usize,
    keyboard: KeyboardNavigation,
}

impl Default for HistorySelection {
    fn default() -> Self {
        Self::new()
    }
}

impl HistorySelection {
    pub fn new() -> Self {
        Self::with_max_selections(DEFAULT_MAX_SELECTIONS)
    }

    pub fn with_max_selections(max_selections: usize) -> Self {
        debug_assert!(max_selections >= 1, "max_selections must be positive");
        Self {
            mode: SelectionMode::Single,
            selected_version: None,
            compare: Vec::with_capacity(max_selections),
            max_selections: max_selections.max(1),
            keyboard: KeyboardNavigation::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn selected_version(&self) -> Option<u32> {
        self.selected_version
    }

    pub fn compare_selection(&self) -> &[HistoryEntry] {
        &self.compare
    }

    pub fn max_selections(&self) -> usize {
        self.max_selections
    }

    pub fn is_compare_ready(&self) -> bool {
        self.mode == SelectionMode::Compare && self.compare.len() == self.max_selections
    }

    pub fn is_compared(&self, version: u32) -> bool {
        self.compare
            .iter()
            .any(|entry| entry.version_number == version)
    }

    pub fn phase(&self) -> SelectionPhase {
        match self.mode {
            SelectionMode::Single => match self.selected_version {
                Some(version) => SelectionPhase::SingleSelected(version),
                None => SelectionPhase::Idle,
            },
            SelectionMode::Compare => match self.compare.len() {
                0 => SelectionPhase::Idle,
                n if n >= self.max_selections => SelectionPhase::CompareReady,
                n => SelectionPhase::CompareBuilding(n),
            },
        }
    }

    /// Position of the single selection in `items`.
    pub fn selected_index(&self, items: &[HistoryEntry]) -> Option<usize> {
        let version = self.selected_version?;
        items
            .iter()
            .position(|entry| entry.version_number == version)
    }

    /// Switching mode always drops every selection.
    pub fn set_mode(&mut self, mode: SelectionMode, listener: &mut dyn SelectionListener) {
        if mode == self.mode {
            return;
        }
        tracing::debug!(from = self.mode.label(), to = mode.label(), "selection mode changed");
        self.mode = mode;
        self.reset();
        listener.on_selection_empty();
    }

    pub fn handle_version_click(
        &mut self,
        entry: &HistoryEntry,
        listener: &mut dyn SelectionListener,
    ) {
        match self.mode {
            SelectionMode::Single => self.click_single(entry, listener),
            SelectionMode::Compare => self.click_compare(entry, listener),
        }
    }

    fn click_single(&mut self, entry: &HistoryEntry, listener: &mut dyn SelectionListener) {
        if self.selected_version == Some(entry.version_number) {
            tracing::debug!(version = entry.version_number, "version deselected");
            self.selected_version = None;
            listener.on_version_deselect();
        } else {
            tracing::debug!(version = entry.version_number, "version selected");
            self.selected_version = Some(entry.version_number);
            listener.on_version_select(entry);
        }
    }

    fn click_compare(&mut self, entry: &HistoryEntry, listener: &mut dyn SelectionListener) {
        if let Some(pos) = self
            .compare
            .iter()
            .position(|selected| selected.version_number == entry.version_number)
        {
            self.compare.remove(pos);
            if self.compare.is_empty() {
                listener.on_selection_empty();
            } else {
                listener.on_compare_select(&self.compare);
            }
            return;
        }

        if self.compare.len() >= self.max_selections {
            self.compare.remove(0);
            self.compare.push(entry.clone());
            listener.on_compare_select(&self.compare);
            return;
        }

        self.compare.push(entry.clone());
        if self.compare.len() == self.max_selections {
            listener.on_compare_select(&self.compare);
        }
    }

    /// Replaces the compare selection with `items` and reports it.
    ///
    /// Repeated versions keep their first position. Only an empty list counts
    /// as "empty"; a partial list is forwarded through `on_compare_select`
    /// like a full one.
    pub fn handle_compare_selected(
        &mut self,
        items: &[HistoryEntry],
        listener: &mut dyn SelectionListener,
    ) {
        if self.mode != SelectionMode::Compare {
            return;
        }
        let mut distinct: Vec<HistoryEntry> = Vec::with_capacity(items.len());
        for item in items {
            if !distinct
                .iter()
                .any(|kept| kept.version_number == item.version_number)
            {
                distinct.push(item.clone());
            }
        }
        let skip = distinct.len().saturating_sub(self.max_selections);
        distinct.drain(..skip);
        self.compare = distinct;
        if self.compare.is_empty() {
            listener.on_selection_empty();
        } else {
            listener.on_compare_select(&self.compare);
        }
    }

    pub fn handle_selection_empty(&mut self, listener: &mut dyn SelectionListener) {
        self.compare.clear();
        listener.on_selection_empty();
    }

    pub fn clear_selections(&mut self, listener: &mut dyn SelectionListener) {
        self.reset();
        listener.on_selection_empty();
    }

    fn reset(&mut self) {
        self.selected_version = None;
        self.compare.clear();
    }

    /// Keyboard navigation is bound only in single mode.
    pub fn sync_keyboard(&mut self, items: Option<&[HistoryEntry]>) {
        let enabled = self.mode == SelectionMode::Single;
        self.keyboard.sync(items, enabled);
    }

    pub fn keyboard_bound(&self) -> bool {
        self.keyboard.is_bound()
    }

    pub fn handle_key(
        &mut self,
        items: Option<&[HistoryEntry]>,
        event: &mut KeyInput,
        listener: &mut dyn SelectionListener,
    ) -> bool {
        if self.mode != SelectionMode::Single {
            return false;
        }
        let current = items.and_then(|items| self.selected_index(items));
        let mut target = KeyboardSelect {
            current,
            selected_version: &mut self.selected_version,
            listener,
        };
        self.keyboard.handle_key(items, event, &mut target)
    }
}

/// Keyboard movement always selects; it never toggles off.
struct KeyboardSelect<'a, 'l> {
    current: Option<usize>,
    selected_version: &'a mut Option<u32>,
    listener: &'a mut (dyn SelectionListener + 'l),
}

impl NavigationTarget<HistoryEntry> for KeyboardSelect<'_, '_> {
    fn current_index(&self) -> Option<usize> {
        self.current
    }

    fn on_navigate(&mut self, entry: &HistoryEntry, index: usize) {
        tracing::debug!(version = entry.version_number, index, "version selected by keyboard");
        *self.selected_version = Some(entry.version_number);
        self.current = Some(index);
        self.listener.on_version_select(entry);
    }
}
