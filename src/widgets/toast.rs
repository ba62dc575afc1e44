use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, ToastKind};
use crate::theme;

pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let Some(toast) = app.toasts.current() else {
        return;
    };

    let toast_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(2),
        width: area.width,
        height: 1,
    };

    let (label, color) = match toast.kind {
        ToastKind::Success => (" OK ", theme::GREEN),
        ToastKind::Error => (" ERROR ", theme::RED),
    };
    let line = Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Black).bg(color)),
        Span::styled(format!(" {}", toast.message), Style::default().fg(color)),
    ]);

    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme::BG_DARK)),
        toast_area,
    );
}
