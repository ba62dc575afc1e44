use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::centered_rect;
use crate::app::HistoryPanel;
use crate::history::{RestoreDialog, RestoreStrategy};
use crate::theme;

fn strategy_line(strategy: RestoreStrategy, chosen: RestoreStrategy, key: &str) -> Line<'static> {
    let (radio, style) = if strategy == chosen {
        ("(•)", Style::default().fg(theme::TEAL).add_modifier(Modifier::BOLD))
    } else {
        ("( )", Style::default().fg(theme::TEXT_DIM))
    };
    let description = match strategy {
        RestoreStrategy::Soft => "write the old values as a new version",
        RestoreStrategy::Hard => "delete every newer version",
    };
    Line::from(vec![
        Span::styled(format!("  {} ", radio), style),
        Span::styled(format!("{} ", key), Style::default().fg(theme::TEXT_MUTED)),
        Span::styled(strategy.label().to_string(), style),
        Span::styled(
            format!("  {}", description),
            Style::default().fg(theme::TEXT_DIM),
        ),
    ])
}

pub fn render(panel: &HistoryPanel, frame: &mut Frame, area: Rect) {
    let (intent, last_error, executing) = match panel.restore.dialog() {
        RestoreDialog::Closed => return,
        RestoreDialog::Open { intent, last_error } => (*intent, last_error.as_deref(), false),
        RestoreDialog::Executing { intent } => (*intent, None, true),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "  Restore {} to version {}?",
                panel.entity.name, intent.target_version
            ),
            Style::default()
                .fg(theme::YELLOW)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        strategy_line(RestoreStrategy::Soft, intent.strategy, "1"),
        strategy_line(RestoreStrategy::Hard, intent.strategy, "2"),
        Line::from(""),
    ];

    if intent.strategy == RestoreStrategy::Hard {
        let doomed = panel
            .entries()
            .iter()
            .filter(|e| e.version_number > intent.target_version)
            .count();
        lines.push(Line::from(Span::styled(
            format!("  {} newer versions will be removed permanently", doomed),
            Style::default().fg(theme::RED),
        )));
        lines.push(Line::from(""));
    }

    if let Some(error) = last_error {
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            Style::default().fg(theme::RED),
        )));
        lines.push(Line::from(""));
    }

    if executing {
        lines.push(Line::from(Span::styled(
            format!("  Running {}...", intent.strategy.action_name()),
            Style::default().fg(theme::TEXT_DIM),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("  y/Enter", Style::default().fg(theme::GREEN)),
            Span::raw(" confirm  "),
            Span::styled("Tab", Style::default().fg(theme::TEAL)),
            Span::raw(" strategy  "),
            Span::styled("n/Esc", Style::default().fg(theme::RED)),
            Span::raw(" cancel"),
        ]));
    }

    let height = (lines.len() as u16 + 2).min(area.height);
    let modal_area = centered_rect(60, height, area);
    frame.render_widget(Clear, modal_area);

    let border = if executing { theme::TEXT_MUTED } else { theme::YELLOW };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Restore version ");

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, modal_area);
}
