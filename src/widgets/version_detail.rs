use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use super::format_time;
use crate::app::HistoryPanel;
use crate::diff::display_value;
use crate::domain::{HistoryEntry, METADATA_FIELDS};
use crate::theme;

pub fn render(panel: &HistoryPanel, frame: &mut Frame, area: Rect) {
    // Selected version wins over the highlight.
    let Some(entry) = panel.selected_entry().or_else(|| panel.highlighted()) else {
        let hint = Paragraph::new(" Select a version to see its snapshot")
            .style(Style::default().fg(theme::TEXT_MUTED));
        frame.render_widget(hint, area);
        return;
    };

    let paragraph = Paragraph::new(lines(entry, panel.latest_version()))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn lines(entry: &HistoryEntry, latest: Option<u32>) -> Vec<Line<'static>> {
    let mut title = vec![Span::styled(
        format!(" Version {}", entry.version_number),
        Style::default()
            .fg(theme::TEAL)
            .add_modifier(Modifier::BOLD),
    )];
    if latest == Some(entry.version_number) {
        title.push(Span::styled("  (current)", Style::default().fg(theme::GREEN)));
    }

    let mut lines = vec![
        Line::from(title),
        field_line("Action", entry.action_type.as_str().to_string()),
        field_line("Changed at", format_time(&entry.changed_at)),
        field_line(
            "Changed by",
            entry.user_name.clone().unwrap_or_else(|| "-".to_string()),
        ),
        Line::from(""),
    ];

    if let Some(ref changes) = entry.changed_fields {
        lines.push(section("Changes"));
        for (field, change) in changes {
            lines.push(Line::from(vec![
                Span::styled(format!("   {:<18}", field), Style::default().fg(theme::TEXT_DIM)),
                Span::styled(display_value(Some(&change.from)), Style::default().fg(theme::RED)),
                Span::styled(" → ", Style::default().fg(theme::TEXT_MUTED)),
                Span::styled(display_value(Some(&change.to)), Style::default().fg(theme::GREEN)),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(section("Snapshot"));
    let (data, metadata): (Vec<_>, Vec<_>) = entry
        .entity_data
        .iter()
        .partition(|(key, _)| !METADATA_FIELDS.contains(&key.as_str()));
    for (key, value) in data.into_iter().chain(metadata) {
        lines.push(field_line(key, display_value(Some(value))));
    }
    lines
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {}", title),
        Style::default()
            .fg(theme::TEXT)
            .add_modifier(Modifier::BOLD),
    ))
}

fn field_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("   {:<18}", label), Style::default().fg(theme::TEXT_DIM)),
        Span::styled(value, Style::default().fg(theme::TEXT)),
    ])
}
