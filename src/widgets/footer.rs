use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, InputMode, Overlay, View};
use crate::history::SelectionMode;
use crate::theme;

pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match (app.overlay, &app.input_mode) {
        (Overlay::Restore, _) => vec![
            ("Tab", "strategy"),
            ("Enter", "confirm"),
            ("Esc", "cancel"),
        ],
        (_, InputMode::Command) => vec![("Esc", "cancel"), ("Tab", "complete"), ("Enter", "execute")],
        (_, InputMode::Search) => vec![("Esc", "cancel"), ("Enter", "apply")],
        (_, InputMode::PendingG) => vec![("g", "top")],
        (_, InputMode::Normal) => match app.view {
            View::EntityList => vec![
                ("j/k", "nav"),
                ("Enter", "history"),
                ("/", "search"),
                ("Tab", "table"),
                (":", "cmd"),
                ("?", "help"),
                ("q", "quit"),
            ],
            View::History => history_hints(app),
        },
    };

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme::TEAL)));
        spans.push(Span::styled(
            format!(":{}", desc),
            Style::default().fg(theme::TEXT_MUTED),
        ));
    }

    let widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::BG_SURFACE));
    frame.render_widget(widget, area);
}

fn history_hints(app: &App) -> Vec<(&'static str, &'static str)> {
    let compare = app
        .panel
        .as_ref()
        .is_some_and(|panel| panel.selection.mode() == SelectionMode::Compare);
    let mut hints = if compare {
        vec![("j/k", "move"), ("Space", "pick"), ("c", "single")]
    } else {
        vec![("↑/↓", "select"), ("Space", "toggle"), ("r", "restore"), ("c", "compare")]
    };
    hints.extend([("x", "clear"), ("Esc", "back"), ("?", "help")]);
    hints
}
