use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config;
use crate::engine::PlaybackEngine;
use crate::transport::{Direction, Poller, Transport};
use crate::ui;

/// Main terminal event loop: polls for end-of-track, redraws from the latest
/// transport snapshot, and maps key presses to transport operations.
/// Returns `Ok(())` when shutdown is requested.
pub fn run<E: PlaybackEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    transport: &mut Transport<E>,
    poller: &mut Poller,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let _ = poller.tick(Instant::now(), transport);

        let snapshot = transport.snapshot();
        terminal.draw(|f| {
            ui::draw(
                f,
                &snapshot,
                transport.playlist(),
                &settings.ui,
                &settings.controls,
            )
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, transport)? {
                    break;
                }
                // Every intent can start or stop playback; keep the poller
                // aligned with the authoritative playing flag.
                if transport.is_playing() {
                    poller.arm(Instant::now());
                } else {
                    poller.stop();
                }
            }
        }
    }

    Ok(())
}

fn handle_key_event<E: PlaybackEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    transport: &mut Transport<E>,
) -> Result<bool, Box<dyn std::error::Error>> {
    match key.code {
        KeyCode::Char('q') => {
            transport.shutdown(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return Ok(true);
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            transport.toggle_play();
        }
        KeyCode::Enter => {
            transport.play();
        }
        KeyCode::Char('l') | KeyCode::Right => {
            transport.advance(Direction::Next);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            transport.advance(Direction::Previous);
        }
        KeyCode::Char('s') => {
            transport.toggle_shuffle();
        }
        KeyCode::Char('r') => {
            transport.cycle_repeat();
        }
        KeyCode::Char('L') => {
            let step = settings.controls.seek_step_percent as f64 / 100.0;
            if let Some(at) = transport.position_fraction() {
                transport.seek(at + step);
            }
        }
        KeyCode::Char('H') => {
            let step = settings.controls.seek_step_percent as f64 / 100.0;
            if let Some(at) = transport.position_fraction() {
                transport.seek(at - step);
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let step = settings.controls.volume_step_percent as f32 / 100.0;
            transport.set_volume(transport.volume() + step);
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            let step = settings.controls.volume_step_percent as f32 / 100.0;
            transport.set_volume(transport.volume() - step);
        }
        KeyCode::Char('m') => {
            transport.toggle_mute();
        }
        _ => {}
    }

    Ok(false)
}
