use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::widgets::TableState;

use crate::action::Action;
use crate::domain::*;
use crate::history::*;
use crate::input::commands::{find_command, table_for_command};

pub const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    EntityList,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
    Search,
    PendingG,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    Restore,
}

#[derive(Debug, Clone)]
pub enum LoadState<T> {
    NotLoaded,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> LoadState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadEntities(EntityTable),
    LoadHistory(EntityRef),
    Restore(EntityRef, RestorePlan),
    InvalidateCache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub at: Instant,
}

/// The most recent notification, shown until it expires.
#[derive(Debug, Default)]
pub struct Toasts {
    current: Option<Toast>,
}

impl Toasts {
    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn show(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.current = Some(Toast {
            kind,
            message: message.into(),
            at: Instant::now(),
        });
    }

    pub fn expire(&mut self, ttl: Duration) {
        if self.current.as_ref().is_some_and(|t| t.at.elapsed() > ttl) {
            self.current = None;
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl Notifier for Toasts {
    fn success(&mut self, message: &str) {
        self.show(ToastKind::Success, message);
    }

    fn error(&mut self, message: &str) {
        self.show(ToastKind::Error, message);
    }
}

fn loaded(entries: &LoadState<Vec<HistoryEntry>>) -> &[HistoryEntry] {
    entries.data().map(Vec::as_slice).unwrap_or(&[])
}

/// One open history panel. Dropped when the panel closes.
pub struct HistoryPanel {
    pub entity: EntitySummary,
    /// Newest first.
    pub entries: LoadState<Vec<HistoryEntry>>,
    pub selection: HistorySelection,
    pub restore: RestoreOrchestrator,
    pub table_state: TableState,
}

impl HistoryPanel {
    fn new(entity: EntitySummary, max_compare: usize) -> Self {
        let restore = RestoreOrchestrator::new(entity.entity_ref());
        Self {
            entity,
            entries: LoadState::Loading,
            selection: HistorySelection::with_max_selections(max_compare),
            restore,
            table_state: TableState::default(),
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        loaded(&self.entries)
    }

    pub fn latest_version(&self) -> Option<u32> {
        latest_version(self.entries())
    }

    pub fn highlighted(&self) -> Option<&HistoryEntry> {
        self.table_state
            .selected()
            .and_then(|idx| self.entries().get(idx))
    }

    pub fn selected_entry(&self) -> Option<&HistoryEntry> {
        self.selection
            .selected_version()
            .and_then(|version| find_version(self.entries(), version))
    }

    fn move_cursor(&mut self, up: bool) {
        let len = self.entries().len();
        if len == 0 {
            return;
        }
        let next = match (self.table_state.selected(), up) {
            (None, _) => 0,
            (Some(idx), true) => idx.saturating_sub(1),
            (Some(idx), false) => (idx + 1).min(len - 1),
        };
        self.table_state.select(Some(next));
    }

    fn apply_events(&mut self, events: Vec<SelectionEvent>) {
        for event in events {
            match event {
                SelectionEvent::VersionSelected(entry) => {
                    let idx = self
                        .entries()
                        .iter()
                        .position(|e| e.version_number == entry.version_number);
                    if idx.is_some() {
                        self.table_state.select(idx);
                    }
                }
                SelectionEvent::CompareSelected(entries) => {
                    tracing::debug!(
                        versions = ?entries.iter().map(|e| e.version_number).collect::<Vec<_>>(),
                        "compare selection changed"
                    );
                }
                SelectionEvent::VersionDeselected | SelectionEvent::SelectionEmpty => {}
            }
        }
    }
}

pub struct App {
    // View state
    pub view: View,
    pub input_mode: InputMode,
    pub overlay: Overlay,

    // Entity list
    pub table: EntityTable,
    pub entities: LoadState<Vec<EntitySummary>>,
    pub entity_table_state: TableState,
    pub search_query: Option<String>,

    // History
    pub panel: Option<HistoryPanel>,
    pub max_compare: usize,

    // Input
    pub input_buffer: String,

    // App
    pub should_quit: bool,
    pub toasts: Toasts,
    pub last_refresh: Option<Instant>,
}

impl App {
    pub fn new(table: EntityTable, max_compare: usize) -> Self {
        Self {
            view: View::EntityList,
            input_mode: InputMode::Normal,
            overlay: Overlay::None,

            table,
            entities: LoadState::NotLoaded,
            entity_table_state: TableState::default(),
            search_query: None,

            panel: None,
            max_compare,

            input_buffer: String::new(),

            should_quit: false,
            toasts: Toasts::default(),
            last_refresh: None,
        }
    }

    pub fn update(&mut self, action: Action) -> Vec<Effect> {
        self.toasts.expire(TOAST_TTL);
        if self.input_mode == InputMode::PendingG
            && !matches!(action, Action::EnterPendingG | Action::Tick)
        {
            self.input_mode = InputMode::Normal;
        }

        match action {
            // Navigation
            Action::NavigateUp => {
                self.navigate(true);
                vec![]
            }
            Action::NavigateDown => {
                self.navigate(false);
                vec![]
            }
            Action::NavigateTop => {
                self.navigate_edge(true);
                vec![]
            }
            Action::NavigateBottom => {
                self.navigate_edge(false);
                vec![]
            }
            Action::Select => match self.view {
                View::EntityList => self.open_history(),
                View::History => self.update(Action::ClickVersion),
            },
            Action::Back => self.handle_back(),

            Action::EnterPendingG => {
                self.input_mode = InputMode::PendingG;
                vec![]
            }

            // History panel
            Action::HistoryKey(code) => {
                self.handle_history_key(code);
                vec![]
            }
            Action::ClickVersion => {
                if let Some(panel) = self.panel.as_mut() {
                    if let Some(entry) = panel.highlighted().cloned() {
                        let mut events = Vec::new();
                        panel.selection.handle_version_click(&entry, &mut events);
                        panel.apply_events(events);
                    }
                }
                vec![]
            }
            Action::ToggleCompareMode => {
                let mode = self.panel.as_ref().map(|p| p.selection.mode().toggled());
                match mode {
                    Some(mode) => self.update(Action::SetSelectionMode(mode)),
                    None => vec![],
                }
            }
            Action::SetSelectionMode(mode) => {
                if let Some(panel) = self.panel.as_mut() {
                    let mut events = Vec::new();
                    panel.selection.set_mode(mode, &mut events);
                    panel
                        .selection
                        .sync_keyboard(panel.entries.data().map(Vec::as_slice));
                    panel.apply_events(events);
                }
                vec![]
            }
            Action::ClearSelection => {
                if let Some(panel) = self.panel.as_mut() {
                    let mut events = Vec::new();
                    panel.selection.clear_selections(&mut events);
                    panel.apply_events(events);
                }
                vec![]
            }
            Action::OpenRestore => {
                self.open_restore();
                vec![]
            }

            // Restore dialog
            Action::ToggleStrategy => {
                if let Some(panel) = self.panel.as_mut() {
                    panel.restore.toggle_strategy();
                }
                vec![]
            }
            Action::SetStrategy(strategy) => {
                if let Some(panel) = self.panel.as_mut() {
                    panel.restore.set_strategy(strategy);
                }
                vec![]
            }
            Action::ConfirmRestore => self.confirm_restore(),
            Action::CancelRestore => {
                self.cancel_restore();
                vec![]
            }

            // Tables
            Action::SwitchTable(table) => self.switch_table(table),
            Action::NextTable => self.cycle_table(true),
            Action::PrevTable => self.cycle_table(false),

            // UI
            Action::OpenCommandInput => {
                self.input_mode = InputMode::Command;
                self.input_buffer.clear();
                vec![]
            }
            Action::OpenSearch => {
                if self.view == View::EntityList {
                    self.input_mode = InputMode::Search;
                    self.input_buffer = self.search_query.clone().unwrap_or_default();
                }
                vec![]
            }
            Action::CloseOverlay => {
                match self.overlay {
                    Overlay::Restore => self.cancel_restore(),
                    Overlay::Help => self.overlay = Overlay::None,
                    Overlay::None => {
                        if self.input_mode != InputMode::Normal {
                            self.input_mode = InputMode::Normal;
                            self.input_buffer.clear();
                        }
                    }
                }
                vec![]
            }
            Action::SubmitCommandInput(cmd) => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.execute_command(&cmd)
            }
            Action::SubmitSearch(query) => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                let query = query.trim().to_string();
                self.search_query = (!query.is_empty()).then_some(query);
                let first = (!self.visible_entities().is_empty()).then_some(0);
                self.entity_table_state.select(first);
                vec![]
            }
            Action::UpdateInputBuffer(buf) => {
                self.input_buffer = buf;
                vec![]
            }
            Action::ToggleHelp => {
                self.overlay = match self.overlay {
                    Overlay::Help => Overlay::None,
                    Overlay::None => Overlay::Help,
                    Overlay::Restore => Overlay::Restore,
                };
                vec![]
            }

            // Data responses
            Action::EntitiesLoaded(table, rows) => {
                if table != self.table {
                    return vec![];
                }
                self.entities = LoadState::Loaded(rows);
                self.last_refresh = Some(Instant::now());
                let len = self.visible_entities().len();
                let selected = match self.entity_table_state.selected() {
                    _ if len == 0 => None,
                    Some(idx) => Some(idx.min(len - 1)),
                    None => Some(0),
                };
                self.entity_table_state.select(selected);
                vec![]
            }
            Action::HistoryLoaded(entity, mut entries) => {
                let Some(panel) = self
                    .panel
                    .as_mut()
                    .filter(|p| p.restore.entity() == &entity)
                else {
                    return vec![];
                };
                entries.sort_by(|a, b| b.version_number.cmp(&a.version_number));
                let has_rows = !entries.is_empty();
                panel.entries = LoadState::Loaded(entries);
                panel
                    .selection
                    .sync_keyboard(panel.entries.data().map(Vec::as_slice));
                if panel.table_state.selected().is_none() && has_rows {
                    panel.table_state.select(Some(0));
                }
                vec![]
            }
            Action::RestoreFinished(entity, result) => self.restore_finished(entity, result),

            // App control
            Action::Refresh => {
                let mut effects = vec![Effect::InvalidateCache, Effect::LoadEntities(self.table)];
                if let Some(panel) = self.panel.as_ref() {
                    effects.push(Effect::LoadHistory(panel.restore.entity().clone()));
                }
                effects
            }
            Action::Quit => {
                self.should_quit = true;
                vec![]
            }
            Action::Tick => vec![],
            Action::Error(msg) => {
                if let Some(panel) = self.panel.as_mut() {
                    if panel.entries.is_loading() {
                        panel.entries = LoadState::Error(msg.clone());
                    }
                }
                if self.entities.is_loading() {
                    self.entities = LoadState::Error(msg.clone());
                }
                self.toasts.error(&msg);
                vec![]
            }
            Action::ClearError => {
                self.toasts.clear();
                vec![]
            }
        }
    }

    /// Where key presses land right now.
    pub fn focus_target(&self) -> FocusTarget {
        match self.input_mode {
            InputMode::Command | InputMode::Search => FocusTarget::TextInput,
            InputMode::Normal | InputMode::PendingG => FocusTarget::List,
        }
    }

    pub fn visible_entities(&self) -> Vec<&EntitySummary> {
        let Some(rows) = self.entities.data() else {
            return vec![];
        };
        match self.search_query.as_deref() {
            Some(query) => rows.iter().filter(|row| row.matches(query)).collect(),
            None => rows.iter().collect(),
        }
    }

    pub fn highlighted_entity(&self) -> Option<&EntitySummary> {
        let idx = self.entity_table_state.selected()?;
        self.visible_entities().get(idx).copied()
    }

    fn navigate(&mut self, up: bool) {
        match self.view {
            View::History => {
                if let Some(panel) = self.panel.as_mut() {
                    panel.move_cursor(up);
                }
            }
            View::EntityList => {
                let len = self.visible_entities().len();
                if len == 0 {
                    return;
                }
                let next = match (self.entity_table_state.selected(), up) {
                    (None, _) => 0,
                    (Some(idx), true) => idx.saturating_sub(1),
                    (Some(idx), false) => (idx + 1).min(len - 1),
                };
                self.entity_table_state.select(Some(next));
            }
        }
    }

    fn navigate_edge(&mut self, top: bool) {
        let (len, state) = match self.view {
            View::History => match self.panel.as_mut() {
                Some(panel) => (loaded(&panel.entries).len(), &mut panel.table_state),
                None => return,
            },
            View::EntityList => {
                let len = self.visible_entities().len();
                (len, &mut self.entity_table_state)
            }
        };
        if len > 0 {
            state.select(Some(if top { 0 } else { len - 1 }));
        }
    }

    fn handle_history_key(&mut self, code: KeyCode) {
        let focus = self.focus_target();
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        let mut event = KeyInput::new(code, focus);
        let mut events = Vec::new();
        let items = panel.entries.data().map(Vec::as_slice);
        if panel.selection.handle_key(items, &mut event, &mut events) {
            panel.apply_events(events);
            return;
        }
        // Unhandled arrows fall back to moving the highlight.
        if !event.is_default_prevented() && focus == FocusTarget::List {
            match code {
                KeyCode::Up => panel.move_cursor(true),
                KeyCode::Down => panel.move_cursor(false),
                _ => {}
            }
        }
    }

    fn open_history(&mut self) -> Vec<Effect> {
        let Some(entity) = self.highlighted_entity().cloned() else {
            return vec![];
        };
        let entity_ref = entity.entity_ref();
        tracing::debug!(entity = %entity_ref, "opening history panel");
        self.panel = Some(HistoryPanel::new(entity, self.max_compare));
        self.view = View::History;
        vec![Effect::LoadHistory(entity_ref)]
    }

    fn close_panel(&mut self) {
        self.panel = None;
        self.view = View::EntityList;
        if self.overlay == Overlay::Restore {
            self.overlay = Overlay::None;
        }
    }

    fn handle_back(&mut self) -> Vec<Effect> {
        match self.view {
            View::History => {
                if self
                    .panel
                    .as_ref()
                    .is_some_and(|p| p.restore.is_executing())
                {
                    return vec![];
                }
                self.close_panel();
                vec![]
            }
            View::EntityList => {
                if self.search_query.take().is_some() {
                    self.entity_table_state.select_first();
                }
                vec![]
            }
        }
    }

    fn open_restore(&mut self) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        if panel.selection.mode() != SelectionMode::Single {
            self.toasts.error("switch to single mode to restore a version");
            return;
        }
        let target = panel
            .selection
            .selected_version()
            .or_else(|| panel.highlighted().map(|e| e.version_number));
        let Some(target) = target else {
            self.toasts.error("select a version to restore");
            return;
        };
        match panel.restore.handle_restore(target, loaded(&panel.entries)) {
            Ok(()) => self.overlay = Overlay::Restore,
            Err(e) => self.toasts.error(&e.to_string()),
        }
    }

    fn confirm_restore(&mut self) -> Vec<Effect> {
        let Some(panel) = self.panel.as_mut() else {
            return vec![];
        };
        match panel.restore.begin_confirm(loaded(&panel.entries)) {
            Ok(plan) => {
                tracing::info!(
                    entity = %panel.restore.entity(),
                    version = plan.intent.target_version,
                    strategy = plan.intent.strategy.action_name(),
                    "restore confirmed"
                );
                vec![Effect::Restore(panel.restore.entity().clone(), plan)]
            }
            Err(RestoreError::NotOpen | RestoreError::Busy) => vec![],
            Err(e) => {
                panel.restore.finish(Err(e), &mut self.toasts);
                vec![]
            }
        }
    }

    fn cancel_restore(&mut self) {
        let closed = self
            .panel
            .as_mut()
            .map_or(true, |panel| panel.restore.close_restore_dialog());
        if closed {
            self.overlay = Overlay::None;
        }
    }

    fn restore_finished(
        &mut self,
        entity: EntityRef,
        result: Result<RestoreReport, RestoreError>,
    ) -> Vec<Effect> {
        let Some(panel) = self
            .panel
            .as_mut()
            .filter(|p| p.restore.entity() == &entity)
        else {
            match result {
                Ok(report) => self.toasts.success(&report.message()),
                Err(e) => self.toasts.error(&e.to_string()),
            }
            return vec![Effect::LoadEntities(self.table)];
        };

        match panel.restore.finish(result, &mut self.toasts) {
            ConfirmOutcome::Restored(_) => {
                self.close_panel();
                vec![Effect::LoadEntities(self.table)]
            }
            ConfirmOutcome::Failed => {
                self.overlay = Overlay::Restore;
                vec![]
            }
            ConfirmOutcome::Ignored => vec![],
        }
    }

    fn switch_table(&mut self, table: EntityTable) -> Vec<Effect> {
        if self.panel.as_ref().is_some_and(|p| p.restore.is_executing()) {
            return vec![];
        }
        self.close_panel();
        self.table = table;
        self.entities = LoadState::Loading;
        self.entity_table_state = TableState::default();
        self.search_query = None;
        vec![Effect::LoadEntities(table)]
    }

    fn cycle_table(&mut self, forward: bool) -> Vec<Effect> {
        let all = EntityTable::ALL;
        let pos = all.iter().position(|t| *t == self.table).unwrap_or(0);
        let next = if forward {
            (pos + 1) % all.len()
        } else {
            (pos + all.len() - 1) % all.len()
        };
        self.switch_table(all[next])
    }

    fn execute_command(&mut self, cmd: &str) -> Vec<Effect> {
        let name = cmd.split_whitespace().next().unwrap_or("");
        let Some(command) = find_command(name) else {
            if !name.is_empty() {
                self.toasts.error(&format!("unknown command: {}", name));
            }
            return vec![];
        };

        if let Some(table) = table_for_command(command.name) {
            return self.switch_table(table);
        }
        match command.name {
            "compare" => self.update(Action::SetSelectionMode(SelectionMode::Compare)),
            "single" => self.update(Action::SetSelectionMode(SelectionMode::Single)),
            "refresh" => self.update(Action::Refresh),
            "quit" => self.update(Action::Quit),
            "help" => {
                self.overlay = Overlay::Help;
                vec![]
            }
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::fixtures::item_history;

    fn paracetamol() -> EntitySummary {
        EntitySummary {
            table: EntityTable::Items,
            id: "item-1".to_string(),
            code: "PCT".to_string(),
            name: "Paracetamol 500mg".to_string(),
            version_count: 3,
            updated_at: None,
        }
    }

    fn item_ref() -> EntityRef {
        EntityRef::new(EntityTable::Items, "item-1")
    }

    /// App with the history panel for item-1 open and loaded.
    fn app_with_history() -> App {
        let mut app = App::new(EntityTable::Items, 2);
        app.update(Action::EntitiesLoaded(EntityTable::Items, vec![paracetamol()]));
        let effects = app.update(Action::Select);
        assert_eq!(effects, vec![Effect::LoadHistory(item_ref())]);
        app.update(Action::HistoryLoaded(item_ref(), item_history()));
        app
    }

    fn panel(app: &App) -> &HistoryPanel {
        app.panel.as_ref().expect("panel open")
    }

    #[test]
    fn history_is_shown_newest_first() {
        let app = app_with_history();
        let versions: Vec<u32> = panel(&app)
            .entries()
            .iter()
            .map(|e| e.version_number)
            .collect();
        assert_eq!(versions, vec![3, 2, 1]);
        assert!(panel(&app).selection.keyboard_bound());
    }

    #[test]
    fn arrow_keys_select_in_single_mode() {
        let mut app = app_with_history();
        app.update(Action::HistoryKey(KeyCode::Down));
        assert_eq!(panel(&app).selection.selected_version(), Some(3));
        app.update(Action::HistoryKey(KeyCode::Down));
        assert_eq!(panel(&app).selection.selected_version(), Some(2));
        app.update(Action::HistoryKey(KeyCode::Up));
        app.update(Action::HistoryKey(KeyCode::Up));
        assert_eq!(panel(&app).selection.selected_version(), Some(1));
        assert_eq!(panel(&app).table_state.selected(), Some(2));
    }

    #[test]
    fn arrow_keys_only_move_highlight_in_compare_mode() {
        let mut app = app_with_history();
        app.update(Action::ToggleCompareMode);
        app.update(Action::HistoryKey(KeyCode::Down));
        let panel = panel(&app);
        assert_eq!(panel.selection.mode(), SelectionMode::Compare);
        assert!(panel.selection.compare_selection().is_empty());
        assert_eq!(panel.table_state.selected(), Some(1));
    }

    #[test]
    fn arrow_keys_ignored_while_typing() {
        let mut app = app_with_history();
        app.update(Action::OpenCommandInput);
        app.update(Action::HistoryKey(KeyCode::Down));
        assert_eq!(panel(&app).selection.selected_version(), None);
        assert_eq!(panel(&app).table_state.selected(), Some(0));
    }

    #[test]
    fn click_selects_then_deselects() {
        let mut app = app_with_history();
        app.update(Action::NavigateDown);
        app.update(Action::ClickVersion);
        assert_eq!(panel(&app).selection.selected_version(), Some(2));
        app.update(Action::ClickVersion);
        assert_eq!(panel(&app).selection.selected_version(), None);
    }

    #[test]
    fn latest_version_cannot_open_restore() {
        let mut app = app_with_history();
        app.update(Action::ClickVersion);
        app.update(Action::OpenRestore);
        assert_eq!(app.overlay, Overlay::None);
        let toast = app.toasts.current().expect("toast");
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(toast.message.contains("latest"));
    }

    #[test]
    fn soft_restore_round_trip_closes_panel() {
        let mut app = app_with_history();
        app.update(Action::NavigateDown);
        app.update(Action::ClickVersion);
        assert_eq!(panel(&app).selection.selected_version(), Some(2));

        app.update(Action::OpenRestore);
        assert_eq!(app.overlay, Overlay::Restore);

        let effects = app.update(Action::ConfirmRestore);
        let [Effect::Restore(entity, plan)] = effects.as_slice() else {
            panic!("expected one restore effect, got {:?}", effects);
        };
        assert_eq!(entity, &item_ref());
        assert_eq!(plan.intent.strategy, RestoreStrategy::Soft);
        assert!(panel(&app).restore.is_executing());

        // Cancel is refused while executing.
        app.update(Action::CancelRestore);
        assert_eq!(app.overlay, Overlay::Restore);

        let report = RestoreReport {
            intent: plan.intent,
            deleted_count: None,
        };
        let effects = app.update(Action::RestoreFinished(item_ref(), Ok(report)));
        assert_eq!(effects, vec![Effect::LoadEntities(EntityTable::Items)]);
        assert!(app.panel.is_none());
        assert_eq!(app.view, View::EntityList);
        assert_eq!(app.overlay, Overlay::None);
        let toast = app.toasts.current().expect("toast");
        assert_eq!(toast.kind, ToastKind::Success);
        assert!(toast.message.contains('2'));
    }

    #[test]
    fn failed_restore_keeps_dialog_open() {
        let mut app = app_with_history();
        app.update(Action::NavigateBottom);
        app.update(Action::OpenRestore);
        app.update(Action::ToggleStrategy);
        app.update(Action::ConfirmRestore);

        let effects = app.update(Action::RestoreFinished(
            item_ref(),
            Err(RestoreError::HardRollback("permission denied".to_string())),
        ));
        assert!(effects.is_empty());
        assert_eq!(app.overlay, Overlay::Restore);
        assert!(app.panel.is_some());
        let toast = app.toasts.current().expect("toast");
        assert!(toast.message.starts_with("rollback failed"));

        app.update(Action::CloseOverlay);
        assert_eq!(app.overlay, Overlay::None);
        assert!(!panel(&app).restore.is_open());
    }

    #[test]
    fn refresh_reloads_open_history() {
        let mut app = app_with_history();
        let effects = app.update(Action::Refresh);
        assert_eq!(
            effects,
            vec![
                Effect::InvalidateCache,
                Effect::LoadEntities(EntityTable::Items),
                Effect::LoadHistory(item_ref()),
            ]
        );
    }

    #[test]
    fn command_switches_table_and_closes_panel() {
        let mut app = app_with_history();
        let effects = app.update(Action::SubmitCommandInput("sup".to_string()));
        assert_eq!(effects, vec![Effect::LoadEntities(EntityTable::Suppliers)]);
        assert_eq!(app.table, EntityTable::Suppliers);
        assert!(app.panel.is_none());
    }

    #[test]
    fn search_filters_entity_list() {
        let mut app = App::new(EntityTable::Items, 2);
        let mut other = paracetamol();
        other.id = "item-2".to_string();
        other.code = "AMX".to_string();
        other.name = "Amoxicillin".to_string();
        app.update(Action::EntitiesLoaded(EntityTable::Items, vec![paracetamol(), other]));

        app.update(Action::SubmitSearch("amx".to_string()));
        assert_eq!(app.visible_entities().len(), 1);
        assert_eq!(app.highlighted_entity().map(|e| e.id.as_str()), Some("item-2"));

        app.update(Action::Back);
        assert_eq!(app.visible_entities().len(), 2);
    }

    #[tokio::test]
    async fn soft_restore_against_memory_store_appends_version() {
        use crate::client::{MemoryStore, QueryCache};
        use crate::worker::{StoreRequest, StoreWorker};
        use std::sync::Arc;

        let (action_tx, mut action_rx) = tokio::sync::mpsc::unbounded_channel();
        let store: Arc<dyn crate::client::HistoryStore> =
            Arc::new(MemoryStore::demo(Some("tester".to_string())));
        let (worker, handle) = StoreWorker::new(store, Arc::new(QueryCache::new()), action_tx);
        tokio::spawn(worker.run());

        let mut app = App::new(EntityTable::Items, 2);
        let pump = |effects: Vec<Effect>| {
            for effect in effects {
                handle.send(match effect {
                    Effect::LoadEntities(table) => StoreRequest::LoadEntities(table),
                    Effect::LoadHistory(entity) => StoreRequest::LoadHistory(entity),
                    Effect::Restore(entity, plan) => StoreRequest::Restore { entity, plan },
                    Effect::InvalidateCache => StoreRequest::InvalidateCache,
                });
            }
        };

        let effects = app.update(Action::SwitchTable(EntityTable::Items));
        pump(effects);
        let loaded = action_rx.recv().await.expect("entities");
        app.update(loaded);

        let idx = app
            .visible_entities()
            .iter()
            .position(|e| e.id == "itm-0001")
            .expect("seeded item");
        app.entity_table_state.select(Some(idx));
        let effects = app.update(Action::Select);
        pump(effects);
        let loaded = action_rx.recv().await.expect("history");
        app.update(loaded);
        assert_eq!(panel(&app).latest_version(), Some(4));

        // v4 is highlighted first; move to v2 and restore it.
        app.update(Action::NavigateDown);
        app.update(Action::NavigateDown);
        app.update(Action::ClickVersion);
        app.update(Action::OpenRestore);
        let effects = app.update(Action::ConfirmRestore);
        pump(effects);
        let finished = action_rx.recv().await.expect("restore result");
        assert!(matches!(finished, Action::RestoreFinished(_, Ok(_))));
        let effects = app.update(finished);
        assert!(app.panel.is_none());
        pump(effects);
        let reloaded = action_rx.recv().await.expect("entities");
        app.update(reloaded);

        let effects = app.update(Action::Select);
        pump(effects);
        let loaded = action_rx.recv().await.expect("history");
        app.update(loaded);
        let panel = panel(&app);
        assert_eq!(panel.latest_version(), Some(5));
        let newest = &panel.entries()[0];
        assert_eq!(newest.user_name.as_deref(), Some("tester"));
        let v2 = find_version(panel.entries(), 2).expect("v2 kept");
        for (key, value) in v2.restore_payload() {
            assert_eq!(newest.entity_data.get(&key), Some(&value), "field {}", key);
        }
    }

    #[test]
    fn stale_history_response_is_dropped() {
        let mut app = app_with_history();
        app.update(Action::Back);
        let effects = app.update(Action::HistoryLoaded(item_ref(), item_history()));
        assert!(effects.is_empty());
        assert!(app.panel.is_none());
    }
}
