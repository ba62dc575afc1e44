use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;
use crate::app::{App, InputMode};
use crate::input::commands::{matching_commands, COMMANDS};
use crate::theme;

pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let (prefix, title, color) = match app.input_mode {
        InputMode::Command => (":", " Command ", theme::YELLOW),
        InputMode::Search => ("/", " Search ", theme::GREEN),
        _ => return,
    };

    let mut spans = vec![
        Span::styled(prefix, Style::default().fg(color)),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(theme::TEXT)),
    ];

    // Ghost completion while the command word is still being typed
    if app.input_mode == InputMode::Command
        && !app.input_buffer.is_empty()
        && !app.input_buffer.contains(' ')
    {
        let typed = app.input_buffer.as_str();
        if let Some(cmd) = matching_commands(typed).first() {
            if let Some(ghost) = cmd.name.strip_prefix(typed).filter(|g| !g.is_empty()) {
                spans.push(Span::styled(ghost, Style::default().fg(theme::TEXT_MUTED)));
            }
        }
    }
    spans.push(Span::styled("_", Style::default().fg(theme::TEXT_MUTED)));

    let mut lines = vec![Line::from(spans)];
    if app.input_mode == InputMode::Command {
        lines.push(suggestions(&app.input_buffer));
    }

    let modal_area = centered_rect(60, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, modal_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .style(Style::default().bg(theme::BG_SURFACE)),
        modal_area,
    );
}

fn suggestions(input_buffer: &str) -> Line<'static> {
    let typed = input_buffer.split_whitespace().next().unwrap_or("");
    let matches = if typed.is_empty() {
        COMMANDS.iter().collect()
    } else {
        matching_commands(typed)
    };
    if matches.is_empty() {
        return Line::from(Span::styled(
            "No matching commands",
            Style::default().fg(theme::TEXT_MUTED),
        ));
    }

    let mut spans = Vec::new();
    for (i, cmd) in matches.iter().enumerate() {
        let style = if i == 0 && !typed.is_empty() {
            Style::default().fg(theme::TEAL)
        } else {
            Style::default().fg(theme::TEXT_DIM)
        };
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(format!(":{}", cmd.name), style));
        for alias in cmd.aliases {
            spans.push(Span::styled(
                format!("|{}", alias),
                Style::default().fg(theme::TEXT_MUTED),
            ));
        }
    }
    Line::from(spans)
}
