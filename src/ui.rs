// src/ui.rs

pub mod chat;
pub mod footer;
pub mod sidebar;

use crate::app::App;
use crate::constants::{EVENT_POLL_MS, SIDEBAR_WIDTH};
use crate::key_handlers::handle_key;
use crossterm::{
    event::{self, Event as CEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

/// Enum for different types of events.
enum Event {
    Input(CEvent),
    Tick,
}

/// Runs the terminal UI until the user quits.
pub async fn run_ui(app: App) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    info!("Terminal UI started");

    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!("Terminal UI exited with error: {:?}", err);
    }
    res
}

/// Main loop of the application.
async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<Event>(100);

    // crossterm polling blocks, so it gets its own thread
    tokio::task::spawn_blocking(move || {
        let tick_rate = Duration::from_millis(EVENT_POLL_MS);
        let mut last_tick = Instant::now();
        loop {
            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            match event::poll(timeout) {
                Ok(true) => {
                    if let Ok(event) = event::read() {
                        if tx.blocking_send(Event::Input(event)).is_err() {
                            return;
                        }
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    error!("Failed to poll terminal events: {}", e);
                    return;
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.blocking_send(Event::Tick).is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });

    loop {
        terminal.draw(|f| draw(f, &app))?;

        match rx.recv().await {
            Some(Event::Input(CEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                handle_key(&mut app, key);
            }
            Some(Event::Input(_)) => {}
            Some(Event::Tick) => {
                app.drain_updates();
                app.tick();
            }
            None => break,
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Renders the sidebar, the active conversation and the footer.
pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
        .split(rows[0]);

    sidebar::draw_sidebar(f, columns[0], app);
    chat::draw_chat(f, columns[1], app);
    footer::draw_footer(f, rows[1], app);
}
