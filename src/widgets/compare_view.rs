use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::app::HistoryPanel;
use crate::diff::{changed_count, compare_snapshots, display_value, FieldStatus};
use crate::theme;

pub fn render(panel: &HistoryPanel, frame: &mut Frame, area: Rect) {
    let selection = panel.selection.compare_selection();
    let [left, right, ..] = selection else {
        let message = format!(
            " Pick {} versions to compare ({} chosen)",
            panel.selection.max_selections(),
            selection.len()
        );
        let hint = Paragraph::new(message).style(Style::default().fg(theme::TEXT_MUTED));
        frame.render_widget(hint, area);
        return;
    };

    let diff = compare_snapshots(&left.entity_data, &right.entity_data);

    let layout = Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).split(area);

    let summary = Line::from(vec![
        Span::styled(
            format!(" v{}", left.version_number),
            Style::default().fg(theme::ORANGE).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ↔ ", Style::default().fg(theme::TEXT_MUTED)),
        Span::styled(
            format!("v{}", right.version_number),
            Style::default().fg(theme::ORANGE).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   {} fields differ", changed_count(&diff)),
            Style::default().fg(theme::TEXT_DIM),
        ),
    ]);
    frame.render_widget(Paragraph::new(summary), layout[0]);

    let rows: Vec<Row> = diff
        .iter()
        .map(|row| {
            let style = match row.status {
                FieldStatus::Same => Style::default().fg(theme::TEXT_MUTED),
                FieldStatus::Changed => Style::default().fg(theme::YELLOW),
                FieldStatus::Added => Style::default().fg(theme::GREEN),
                FieldStatus::Removed => Style::default().fg(theme::RED),
            };
            let marker = match row.status {
                FieldStatus::Same => " ",
                FieldStatus::Changed => "~",
                FieldStatus::Added => "+",
                FieldStatus::Removed => "-",
            };
            Row::new(vec![
                Cell::from(marker),
                Cell::from(row.field.clone()),
                Cell::from(display_value(row.left.as_ref())),
                Cell::from(display_value(row.right.as_ref())),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("FIELD"),
        Cell::from(format!("v{}", left.version_number)),
        Cell::from(format!("v{}", right.version_number)),
    ])
    .style(
        Style::default()
            .fg(theme::TEXT_DIM)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(1),
            Constraint::Length(18),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ],
    )
    .header(header);
    frame.render_widget(table, layout[1]);
}
