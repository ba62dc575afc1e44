use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, View};
use crate::domain::EntityTable;
use crate::theme;

pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let mut left_spans: Vec<Span> = vec![
        Span::styled(
            " apohist ",
            Style::default()
                .fg(theme::TEAL)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("| ", Style::default().fg(theme::TEXT_MUTED)),
    ];

    for table in EntityTable::ALL {
        let style = if table == app.table {
            Style::default()
                .fg(theme::TEXT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme::TEXT_MUTED)
        };
        left_spans.push(Span::styled(table.label(), style));
        left_spans.push(Span::raw(" "));
    }

    // Breadcrumb for the open history
    if let (View::History, Some(panel)) = (app.view, app.panel.as_ref()) {
        left_spans.push(Span::styled("> ", Style::default().fg(theme::TEXT_MUTED)));
        left_spans.push(Span::styled(
            panel.entity.name.as_str(),
            Style::default().fg(theme::TEXT_DIM),
        ));
    }

    if let Some(ref query) = app.search_query {
        left_spans.push(Span::styled("  /", Style::default().fg(theme::GREEN)));
        left_spans.push(Span::styled(query.as_str(), Style::default().fg(theme::TEXT)));
    }

    let mut right_spans: Vec<Span> = Vec::new();
    if let Some(rows) = app.entities.data() {
        right_spans.push(Span::styled(
            format!("[{} rows]", rows.len()),
            Style::default().fg(theme::TEXT_MUTED),
        ));
    }
    if let Some(at) = app.last_refresh {
        right_spans.push(Span::styled(
            format!("  ↻ {}s ago", at.elapsed().as_secs()),
            Style::default().fg(theme::TEXT_MUTED),
        ));
    }
    right_spans.push(Span::raw(" "));

    let left_width: usize = left_spans.iter().map(|s| s.width()).sum();
    let right_width: usize = right_spans.iter().map(|s| s.width()).sum();
    let gap = (area.width as usize).saturating_sub(left_width + right_width);

    let mut spans = left_spans;
    spans.push(Span::raw(" ".repeat(gap)));
    spans.extend(right_spans);

    let widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::BG_BAR));
    frame.render_widget(widget, area);
}
