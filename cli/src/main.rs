//! Tableside CLI - binary entry point and terminal session management.
//!
//! ```text
//! main() -> TerminalSession::new() -> run_app() -> App (dashboard | floor)
//!                                         |
//!                                         v
//!                               RunResult::Quit | Reload
//! ```
//!
//! Each pane sits behind its own fault boundary. "Refresh Page" on a fallback
//! sets a flag the frame loop picks up; the loop then drops the app and the
//! terminal session and builds both again from scratch.
//!
//! # Event Loop
//!
//! Fixed 8ms render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`input::InputPump`])
//! 3. Render frame
//! 4. Check for quit or reload

mod app;
mod input;
mod screens;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tableside_config::TablesideConfig;
use tableside_core::install_panic_hook;

use app::{App, Settings};
use input::InputPump;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: drop logs rather than write over the TUI.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.tableside/logs/tableside.log
    if let Some(config_path) = TablesideConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("tableside.log"));
    }

    // Fallback: ./.tableside/logs/tableside.log
    candidates.push(PathBuf::from(".tableside").join("logs").join("tableside.log"));

    candidates
}

fn load_settings() -> Settings {
    let config = match TablesideConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(path = %err.path().display(), "Using default config: {err}");
            None
        }
    };
    let settings = Settings::from_config(config.as_ref());
    tracing::info!(
        environment = settings.policy.as_str(),
        max_retries = settings.max_retries,
        "Settings resolved"
    );
    settings
}

enum RunResult {
    Quit,
    Reload,
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Raw mode and the alternate screen are restored on drop, so the terminal
/// stays usable after an error or an uncontained panic.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    install_panic_hook();

    let settings = load_settings();

    loop {
        let run_result = {
            let mut app = App::new(settings);
            let mut session = TerminalSession::new()?;
            run_app(&mut session.terminal, &mut app).await
        };

        match run_result {
            Ok(RunResult::Reload) => {
                tracing::info!("Rebuilding application after refresh");
            }
            Ok(RunResult::Quit) => break,
            Err(err) => {
                tracing::error!("Exiting on error: {err:?}");
                eprintln!("Error: {err:?}");
                break;
            }
        }
    }

    Ok(())
}

const FRAME_DURATION: Duration = Duration::from_millis(8);

async fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<RunResult>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<RunResult> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        let events = match input.drain() {
            Ok(events) => events,
            Err(e) => break Err(e),
        };
        for event in &events {
            app.handle_event(event);
        }
        if app.should_quit() {
            break Ok(RunResult::Quit);
        }

        if let Err(e) = terminal.draw(|frame| app.draw(frame)) {
            break Err(e.into());
        }

        if app.reload_requested() {
            break Ok(RunResult::Reload);
        }
    };

    input.shutdown().await;
    result
}
