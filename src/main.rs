use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use ratatui::layout::{Constraint, Layout};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use apohist::action::Action;
use apohist::app::{App, Effect, InputMode, Overlay, View};
use apohist::client::{HistoryStore, MemoryStore, QueryCache};
use apohist::config::{Cli, ConfigFile, Settings};
use apohist::event::{key_to_action, AppEvent, EventHandler};
use apohist::history::SelectionMode;
use apohist::tui::TerminalGuard;
use apohist::widgets;
use apohist::worker::{StoreHandle, StoreRequest, StoreWorker};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    let settings = Settings::resolve(&cli, ConfigFile::load())?;
    tracing::info!(?settings, "starting apohist");

    run_tui(settings).await
}

/// File logging only; the terminal belongs to the TUI.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(ref log_file) = cli.log_file {
        let file = std::fs::File::create(log_file)
            .wrap_err_with(|| format!("cannot create log file {}", log_file))?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(filter())
            .init();
        return Ok(None);
    }

    if let Some(ref log_dir) = cli.log_dir {
        let appender = tracing_appender::rolling::daily(log_dir, "apohist.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .with_env_filter(filter())
            .init();
        return Ok(Some(guard));
    }

    Ok(None)
}

async fn run_tui(settings: Settings) -> Result<()> {
    let store: Arc<dyn HistoryStore> = match settings.data {
        Some(ref path) => Arc::new(
            MemoryStore::open(path, settings.user.clone())
                .await
                .wrap_err("failed to open data file")?,
        ),
        None => Arc::new(MemoryStore::demo(settings.user.clone())),
    };
    let cache = Arc::new(QueryCache::new());

    let mut app = App::new(settings.table, settings.max_compare);

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let (worker, store_handle) = StoreWorker::new(store, cache, action_tx);
    tokio::spawn(worker.run());

    let effects = app.update(Action::SwitchTable(settings.table));
    handle_effects(effects, &store_handle);

    let mut terminal = TerminalGuard::new()?;
    let mut events = EventHandler::new(Duration::from_millis(250));

    loop {
        terminal.draw(|frame| render(&mut app, frame))?;

        tokio::select! {
            Some(event) = events.next() => {
                let action = match event {
                    AppEvent::Key(key) => key_to_action(
                        key,
                        app.view,
                        &app.input_mode,
                        app.overlay,
                        &app.input_buffer,
                    ),
                    AppEvent::Resize => None,
                    AppEvent::Tick => Some(Action::Tick),
                };
                if let Some(action) = action {
                    let effects = app.update(action);
                    handle_effects(effects, &store_handle);
                }
            }
            Some(action) = action_rx.recv() => {
                let effects = app.update(action);
                handle_effects(effects, &store_handle);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn render(app: &mut App, frame: &mut ratatui::Frame) {
    let area = frame.area();

    frame.render_widget(
        ratatui::widgets::Block::default()
            .style(ratatui::style::Style::default().bg(apohist::theme::BG_DARK)),
        area,
    );

    let layout = Layout::vertical([
        Constraint::Length(1), // Tab bar
        Constraint::Fill(1),  // Content
        Constraint::Length(1), // Footer
    ])
    .split(area);

    widgets::tab_bar::render(app, frame, layout[0]);

    let content_area = layout[1];
    match app.view {
        View::EntityList => widgets::entity_list::render(app, frame, content_area),
        View::History => {
            if let Some(panel) = app.panel.as_mut() {
                let rows = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)])
                    .split(content_area);
                let columns =
                    Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                        .split(rows[0]);
                widgets::timeline::render(panel, frame, columns[0]);
                if panel.selection.mode() == SelectionMode::Compare {
                    widgets::compare_view::render(panel, frame, columns[1]);
                } else {
                    widgets::version_detail::render(panel, frame, columns[1]);
                }
                widgets::status_bar::render(panel, frame, rows[1]);
            }
        }
    }

    widgets::footer::render(app, frame, layout[2]);

    match app.overlay {
        Overlay::Help => widgets::help_overlay::render(app.view, frame, area),
        Overlay::Restore => {
            if let Some(panel) = app.panel.as_ref() {
                widgets::restore_dialog::render(panel, frame, area);
            }
        }
        Overlay::None => {}
    }

    if matches!(app.input_mode, InputMode::Command | InputMode::Search) {
        widgets::command_input::render(app, frame, area);
    }

    widgets::toast::render(app, frame, area);
}

fn handle_effects(effects: Vec<Effect>, store_handle: &StoreHandle) {
    for effect in effects {
        match effect {
            Effect::LoadEntities(table) => store_handle.send(StoreRequest::LoadEntities(table)),
            Effect::LoadHistory(entity) => store_handle.send(StoreRequest::LoadHistory(entity)),
            Effect::Restore(entity, plan) => {
                store_handle.send(StoreRequest::Restore { entity, plan })
            }
            Effect::InvalidateCache => store_handle.send(StoreRequest::InvalidateCache),
        }
    }
}
