use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Row};
use ratatui::Frame;

use super::collection::{header_row, render_collection, CollectionTable};
use super::format_time;
use crate::app::{HistoryPanel, LoadState};
use crate::domain::{ActionType, HistoryEntry};
use crate::history::SelectionMode;
use crate::theme;

fn action_style(action: ActionType) -> Style {
    match action {
        ActionType::Insert => Style::default().fg(theme::GREEN),
        ActionType::Update => Style::default().fg(theme::BLUE),
        ActionType::Delete => Style::default().fg(theme::RED),
    }
}

fn marker(panel: &HistoryPanel, entry: &HistoryEntry) -> Span<'static> {
    let version = entry.version_number;
    match panel.selection.mode() {
        SelectionMode::Single if panel.selection.selected_version() == Some(version) => {
            Span::styled("●", Style::default().fg(theme::TEAL))
        }
        SelectionMode::Compare if panel.selection.is_compared(version) => Span::styled(
            "◆",
            Style::default()
                .fg(theme::ORANGE)
                .add_modifier(Modifier::BOLD),
        ),
        SelectionMode::Compare => Span::styled("○", Style::default().fg(theme::TEXT_MUTED)),
        SelectionMode::Single => Span::raw(" "),
    }
}

pub fn render(panel: &mut HistoryPanel, frame: &mut Frame, area: Rect) {
    let latest = panel.latest_version();
    let restore_allowed = panel.selection.mode() == SelectionMode::Single;

    let rows = panel.entries.data().map(|entries| {
        entries
            .iter()
            .map(|entry| {
                let is_latest = Some(entry.version_number) == latest;
                // No restore affordance on the current version.
                let tag = if is_latest {
                    Span::styled("latest", Style::default().fg(theme::GREEN))
                } else if restore_allowed {
                    Span::styled("r:restore", Style::default().fg(theme::TEXT_MUTED))
                } else {
                    Span::raw("")
                };
                let changes = match entry.action_type {
                    ActionType::Update => format!("{} fields", entry.changed_field_count()),
                    _ => String::new(),
                };
                Row::new(vec![
                    Cell::from(marker(panel, entry)),
                    Cell::from(format!("v{}", entry.version_number))
                        .style(Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD)),
                    Cell::from(Line::from(vec![
                        Span::styled(entry.action_type.symbol(), action_style(entry.action_type)),
                        Span::raw(" "),
                        Span::styled(entry.action_type.as_str(), action_style(entry.action_type)),
                    ])),
                    Cell::from(format_time(&entry.changed_at))
                        .style(Style::default().fg(theme::TEXT_DIM)),
                    Cell::from(entry.user_name.clone().unwrap_or_else(|| "-".to_string()))
                        .style(Style::default().fg(theme::TEXT_DIM)),
                    Cell::from(changes).style(Style::default().fg(theme::TEXT_MUTED)),
                    Cell::from(tag),
                ])
            })
            .collect::<Vec<_>>()
    });

    let empty_label = match &panel.entries {
        LoadState::Error(_) => " Failed to load history",
        _ => " No history recorded",
    };

    let title = format!(
        " {} · {} ",
        panel.entity.name,
        panel.selection.mode().label()
    );
    let table = CollectionTable {
        header: header_row(&["", "VER", "ACTION", "CHANGED AT", "USER", "", ""]),
        rows,
        widths: vec![
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(17),
            Constraint::Fill(1),
            Constraint::Length(10),
            Constraint::Length(9),
        ],
        block: Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(theme::TEXT_MUTED))
            .title(Span::styled(title, Style::default().fg(theme::TEAL))),
        loading_label: " Loading history...",
        empty_label,
        is_loading: panel.entries.is_loading(),
    };
    render_collection(frame, area, &mut panel.table_state, table);
}
