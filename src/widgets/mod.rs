use ratatui::layout::{Constraint, Flex, Layout, Rect};

pub mod collection;
pub mod command_input;
pub mod compare_view;
pub mod entity_list;
pub mod footer;
pub mod help_overlay;
pub mod restore_dialog;
pub mod status_bar;
pub mod tab_bar;
pub mod timeline;
pub mod toast;
pub mod version_detail;

pub(crate) fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .split(area);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .split(vertical[0]);
    horizontal[0]
}

pub(crate) fn format_time(time: &chrono::DateTime<chrono::Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}
