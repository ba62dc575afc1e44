use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;
use crate::app::View;
use crate::theme;

pub fn render(view: View, frame: &mut Frame, area: Rect) {
    let mut lines = vec![];

    lines.push(Line::from(""));
    lines.push(section("Navigation"));
    lines.push(binding("j / k", "Move the highlight"));
    lines.push(binding("gg / G", "Go to top / bottom"));
    lines.push(binding("Tab / Shift+Tab", "Next / previous table"));

    match view {
        View::EntityList => {
            lines.push(binding("Enter", "Open version history"));
            lines.push(binding("/ (slash)", "Filter by code or name"));
            lines.push(binding("Esc", "Clear filter"));
        }
        View::History => {
            lines.push(Line::from(""));
            lines.push(section("History"));
            lines.push(binding("Up / Down", "Select previous / next version"));
            lines.push(binding("Enter / Space", "Select or pick the highlighted version"));
            lines.push(binding("c", "Toggle compare mode"));
            lines.push(binding("x", "Clear selection"));
            lines.push(binding("r", "Restore the selected version"));
            lines.push(binding("Esc", "Close history"));

            lines.push(Line::from(""));
            lines.push(section("Restore dialog"));
            lines.push(binding("Tab / 1 / 2", "Soft restore or hard rollback"));
            lines.push(binding("y / Enter", "Confirm"));
            lines.push(binding("n / Esc", "Cancel"));
        }
    }

    lines.push(Line::from(""));
    lines.push(section("Commands"));
    lines.push(binding(":items :cat :ty", "Switch table"));
    lines.push(binding(":pkg :sup", "Switch table"));
    lines.push(binding(":compare / :single", "Selection mode"));
    lines.push(binding(":refresh", "Reload from the store"));
    lines.push(binding(":q", "Quit"));

    lines.push(Line::from(""));
    lines.push(section("General"));
    lines.push(binding("Ctrl+R", "Refresh"));
    lines.push(binding("Ctrl+L", "Dismiss notification"));
    lines.push(binding("?", "Toggle this help"));

    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(4));
    let modal_area = centered_rect(60, height, area);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::TEAL))
        .title(" Help (? to close) ");

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, modal_area);
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        format!("  {}", title),
        Style::default()
            .fg(theme::TEAL)
            .add_modifier(Modifier::BOLD),
    ))
}

fn binding<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {:<22}", key), Style::default().fg(theme::YELLOW)),
        Span::styled(desc, Style::default().fg(theme::TEXT)),
    ])
}
