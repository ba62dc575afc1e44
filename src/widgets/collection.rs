use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::theme;

/// A list table with loading and empty placeholders.
pub struct CollectionTable<'a> {
    pub header: Row<'a>,
    pub rows: Option<Vec<Row<'a>>>,
    pub widths: Vec<Constraint>,
    pub block: Block<'a>,
    pub loading_label: &'static str,
    pub empty_label: &'static str,
    pub is_loading: bool,
}

pub fn render_collection(
    frame: &mut Frame,
    area: Rect,
    state: &mut TableState,
    table: CollectionTable<'_>,
) {
    let rows = match table.rows {
        Some(rows) if !rows.is_empty() => rows,
        _ => {
            let label = if table.is_loading {
                table.loading_label
            } else {
                table.empty_label
            };
            let placeholder = Paragraph::new(label)
                .block(table.block)
                .style(Style::default().fg(theme::TEXT_MUTED));
            frame.render_widget(placeholder, area);
            return;
        }
    };

    let widget = Table::new(rows, table.widths)
        .header(table.header)
        .block(table.block)
        .row_highlight_style(
            Style::default()
                .bg(theme::BG_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(widget, area, state);
}

pub fn header_row(labels: &[&'static str]) -> Row<'static> {
    Row::new(
        labels
            .iter()
            .map(|label| Cell::from(*label))
            .collect::<Vec<_>>(),
    )
    .style(
        Style::default()
            .fg(theme::TEXT_DIM)
            .add_modifier(Modifier::BOLD),
    )
    .height(1)
}

pub fn plain_block() -> Block<'static> {
    Block::default().borders(Borders::NONE)
}
