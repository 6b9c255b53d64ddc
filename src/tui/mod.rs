//! Terminal User Interface
//!
//! Sign-in screens and the issuance wizard, drawn with ratatui on a
//! crossterm backend.

pub mod app;
pub mod auth;
pub mod events;
pub mod onboarding;
pub mod onboarding_render;
pub mod render;

pub use app::App;
pub use events::{EventHandler, TuiEvent};

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, Show},
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;

/// Restores the terminal even if the loop bails out early
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste, Hide)
            .context("Failed to enter alternate screen")?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), Show, DisableBracketedPaste, LeaveAlternateScreen);
    }
}

/// Run the TUI until the user quits
pub async fn run(mut app: App) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(io::stdout())).context("Failed to create terminal")?;
    terminal.clear()?;

    EventHandler::start_terminal_listener(app.event_sender());
    app.initialize();

    let result = event_loop(&mut terminal, &mut app).await;

    app.shutdown();
    terminal.show_cursor()?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| render::render(f, app))?;

        let Some(event) = app.next_event().await else {
            tracing::debug!("Event channel closed");
            break;
        };
        app.handle_event(event).await?;

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
