use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Cell, Row};
use ratatui::Frame;

use super::collection::{header_row, plain_block, render_collection, CollectionTable};
use super::format_time;
use crate::app::App;
use crate::theme;

pub fn render(app: &mut App, frame: &mut Frame, area: Rect) {
    let rows = app.entities.data().map(|_| {
        app.visible_entities()
            .into_iter()
            .map(|entity| {
                let updated = entity
                    .updated_at
                    .as_ref()
                    .map(format_time)
                    .unwrap_or_else(|| "-".to_string());
                Row::new(vec![
                    Cell::from(entity.code.clone()).style(Style::default().fg(theme::TEAL)),
                    Cell::from(entity.name.clone()).style(Style::default().fg(theme::TEXT)),
                    Cell::from(format!("v{}", entity.version_count))
                        .style(Style::default().fg(theme::TEXT_DIM)),
                    Cell::from(updated).style(Style::default().fg(theme::TEXT_DIM)),
                    Cell::from(entity.id.clone()).style(Style::default().fg(theme::TEXT_MUTED)),
                ])
            })
            .collect::<Vec<_>>()
    });

    let empty_label = if app.search_query.is_some() {
        " No rows match the search"
    } else {
        " No rows in this table"
    };

    let table = CollectionTable {
        header: header_row(&["CODE", "NAME", "VERSIONS", "UPDATED", "ID"]),
        rows,
        widths: vec![
            Constraint::Length(12),
            Constraint::Fill(1),
            Constraint::Length(9),
            Constraint::Length(17),
            Constraint::Length(14),
        ],
        block: plain_block(),
        loading_label: " Loading...",
        empty_label,
        is_loading: app.entities.is_loading(),
    };
    render_collection(frame, area, &mut app.entity_table_state, table);
}
