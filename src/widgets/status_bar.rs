use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::HistoryPanel;
use crate::history::{SelectionMode, SelectionPhase};
use crate::theme;

/// Selection mode and phase for the open history panel.
pub fn render(panel: &HistoryPanel, frame: &mut Frame, area: Rect) {
    let mode = panel.selection.mode();
    let mode_style = match mode {
        SelectionMode::Single => Style::default().fg(theme::BG_DARK).bg(theme::TEAL),
        SelectionMode::Compare => Style::default().fg(theme::BG_DARK).bg(theme::ORANGE),
    };

    let phase = match panel.selection.phase() {
        SelectionPhase::Idle => "nothing selected".to_string(),
        SelectionPhase::SingleSelected(version) => format!("version {} selected", version),
        SelectionPhase::CompareBuilding(count) => format!(
            "{}/{} versions picked",
            count,
            panel.selection.max_selections()
        ),
        SelectionPhase::CompareReady => "ready to compare".to_string(),
    };

    let keyboard = if panel.selection.keyboard_bound() {
        Span::styled("  ↑↓ select", Style::default().fg(theme::TEXT_MUTED))
    } else {
        Span::raw("")
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label().to_uppercase()),
            mode_style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", phase), Style::default().fg(theme::TEXT_DIM)),
        Span::styled(
            format!("  {} versions", panel.entries().len()),
            Style::default().fg(theme::TEXT_MUTED),
        ),
        keyboard,
    ]);
    let widget = Paragraph::new(line).style(Style::default().bg(theme::BG_BAR));
    frame.render_widget(widget, area);
}
