use std::env;
use std::path::Path;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config::Settings;
use crate::engine::RodioEngine;
use crate::playlist::{Playlist, scan};
use crate::transport::{Poller, Transport};

mod event_loop;
mod startup;

/// A broken or invalid config file should not keep the player from starting;
/// complain on stderr and fall back to defaults.
fn load_settings() -> Settings {
    let loaded = Settings::load()
        .map_err(|e| format!("failed to load config: {e}"))
        .and_then(|s| match s.validate() {
            Ok(()) => Ok(s),
            Err(msg) => Err(format!("invalid config: {msg}")),
        });

    loaded.unwrap_or_else(|msg| {
        eprintln!("cadenza: {msg}, using defaults");
        Settings::default()
    })
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings();

    let dir = env::args().nth(1).unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "Music".to_string())
    });

    let tracks = scan(Path::new(&dir), &settings.library);
    let playlist = Playlist::from_tracks(tracks);

    let engine = RodioEngine::new()?;
    let mut transport = Transport::new(playlist, engine);
    startup::apply_playback_defaults(&mut transport, &settings);

    let mut poller = Poller::new(
        Duration::from_millis(settings.poller.period_ms),
        Duration::from_millis(settings.poller.end_epsilon_ms),
    );

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut transport, &mut poller);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
