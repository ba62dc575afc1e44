use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::action::Action;
use crate::app::{InputMode, Overlay, View};
use crate::history::RestoreStrategy;

pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Terminal events and ticks on one channel.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut tick = tokio::time::interval(tick_rate);

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        if tx.send(AppEvent::Tick).is_err() {
                            break;
                        }
                    }
                    event = reader.next() => {
                        let app_event = match event {
                            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                                AppEvent::Key(key)
                            }
                            Some(Ok(Event::Resize(_, _))) => AppEvent::Resize,
                            Some(Ok(_)) => continue,
                            Some(Err(e)) => {
                                tracing::error!("terminal event stream failed: {}", e);
                                break;
                            }
                            None => break,
                        };
                        if tx.send(app_event).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

fn edit_buffer(input_buffer: &str, code: KeyCode) -> Option<Action> {
    let mut buf = input_buffer.to_string();
    match code {
        KeyCode::Backspace => {
            buf.pop();
        }
        KeyCode::Char(c) => buf.push(c),
        _ => return None,
    }
    Some(Action::UpdateInputBuffer(buf))
}

/// Map a key event to an action based on current app state
pub fn key_to_action(
    key: KeyEvent,
    view: View,
    input_mode: &InputMode,
    overlay: Overlay,
    input_buffer: &str,
) -> Option<Action> {
    match overlay {
        Overlay::Help => {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    Some(Action::ToggleHelp)
                }
                _ => None,
            };
        }
        Overlay::Restore => {
            return match key.code {
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                    Some(Action::ToggleStrategy)
                }
                KeyCode::Char('1') | KeyCode::Char('s') => {
                    Some(Action::SetStrategy(RestoreStrategy::Soft))
                }
                KeyCode::Char('2') | KeyCode::Char('h') => {
                    Some(Action::SetStrategy(RestoreStrategy::Hard))
                }
                KeyCode::Char('y') | KeyCode::Enter => Some(Action::ConfirmRestore),
                KeyCode::Char('n') | KeyCode::Esc => Some(Action::CancelRestore),
                _ => None,
            };
        }
        Overlay::None => {}
    }

    match input_mode {
        InputMode::Command => {
            return match key.code {
                KeyCode::Esc => Some(Action::CloseOverlay),
                KeyCode::Enter => Some(Action::SubmitCommandInput(input_buffer.to_string())),
                KeyCode::Tab => {
                    let input_cmd = input_buffer.split_whitespace().next().unwrap_or("");
                    let matches = crate::input::commands::matching_commands(input_cmd);
                    matches
                        .first()
                        .map(|cmd| Action::UpdateInputBuffer(cmd.name.to_string()))
                }
                // Reaches the history list, which ignores keys aimed at text input.
                KeyCode::Up | KeyCode::Down if view == View::History => {
                    Some(Action::HistoryKey(key.code))
                }
                code => edit_buffer(input_buffer, code),
            };
        }
        InputMode::Search => {
            return match key.code {
                KeyCode::Esc => Some(Action::CloseOverlay),
                KeyCode::Enter => Some(Action::SubmitSearch(input_buffer.to_string())),
                code => edit_buffer(input_buffer, code),
            };
        }
        InputMode::PendingG if key.code == KeyCode::Char('g') => {
            return Some(Action::NavigateTop);
        }
        InputMode::PendingG | InputMode::Normal => {}
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Char('l') => Some(Action::ClearError),
            _ => None,
        };
    }

    match key.code {
        // Global
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char(':') => Some(Action::OpenCommandInput),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('j') => Some(Action::NavigateDown),
        KeyCode::Char('k') => Some(Action::NavigateUp),
        KeyCode::Char('g') => Some(Action::EnterPendingG),
        KeyCode::Char('G') => Some(Action::NavigateBottom),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Tab => Some(Action::NextTable),
        KeyCode::BackTab => Some(Action::PrevTable),

        code => match view {
            View::EntityList => match code {
                KeyCode::Down => Some(Action::NavigateDown),
                KeyCode::Up => Some(Action::NavigateUp),
                KeyCode::Enter | KeyCode::Char('l') => Some(Action::Select),
                KeyCode::Char('/') => Some(Action::OpenSearch),
                _ => None,
            },
            View::History => match code {
                KeyCode::Up | KeyCode::Down => Some(Action::HistoryKey(code)),
                KeyCode::Enter | KeyCode::Char(' ') => Some(Action::ClickVersion),
                KeyCode::Char('c') => Some(Action::ToggleCompareMode),
                KeyCode::Char('x') => Some(Action::ClearSelection),
                KeyCode::Char('r') => Some(Action::OpenRestore),
                KeyCode::Char('h') => Some(Action::Back),
                _ => None,
            },
        },
    }
}
