//! UI rendering helpers for the terminal user interface.
//!
//! Rendering is a pure function of the latest `TransportSnapshot` and the
//! playlist: the transport never reaches into widgets, and drawing the same
//! snapshot twice produces the same screen.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::playlist::{Playlist, format_mmss};
use crate::transport::{RepeatPhase, TransportSnapshot};

fn controls_text(controls: &ControlsSettings) -> String {
    [
        "[space/p] play/pause".to_string(),
        "[l/h] next/prev".to_string(),
        "[s] shuffle".to_string(),
        "[r] repeat".to_string(),
        format!("[H/L] seek -/+{}%", controls.seek_step_percent),
        format!("[-/+] volume {}%", controls.volume_step_percent),
        "[m] mute".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Build the position/duration text (elapsed/total/remaining) per `UiSettings`.
fn time_text(position: Duration, total: Option<Duration>, ui: &UiSettings) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(position)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    parts.push(format!("-{}", format_mmss(t.saturating_sub(position))));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

fn status_line(snapshot: &TransportSnapshot, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(if snapshot.playing {
        "Playing".to_string()
    } else {
        "Paused".to_string()
    });

    if snapshot.track_count > 0 {
        parts.push(format!(
            "Track: {} / {}",
            snapshot.track_number, snapshot.track_count
        ));
        if let Some(time) = time_text(snapshot.position, snapshot.duration, ui) {
            parts.push(format!("Song: {} [{}]", snapshot.track_display, time));
        } else {
            parts.push(format!("Song: {}", snapshot.track_display));
        }
    }

    parts.push(
        match snapshot.repeat {
            RepeatPhase::None => "Repeat: off",
            RepeatPhase::One => "Repeat: one",
            RepeatPhase::All => "Repeat: all",
        }
        .to_string(),
    );
    parts.push(if snapshot.shuffle {
        "Shuffle: ON".to_string()
    } else {
        "Shuffle: OFF".to_string()
    });

    if snapshot.muted {
        parts.push("Volume: muted".to_string());
    } else {
        parts.push(format!("Volume: {}%", (snapshot.volume * 100.0).round()));
    }

    if let Some(warning) = &snapshot.warning {
        parts.push(format!("! {}", warning));
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    snapshot: &TransportSnapshot,
    playlist: &Playlist,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadenza ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = Paragraph::new(status_line(snapshot, ui_settings))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Track list, current track highlighted.
    let items: Vec<ListItem> = playlist
        .iter()
        .enumerate()
        .map(|(i, t)| ListItem::new(format!("{:>3}. {}", i + 1, t.display)))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" tracks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if snapshot.track_count > 0 {
        state.select(Some(snapshot.track_number - 1));
    }
    frame.render_stateful_widget(list, chunks[2], &mut state);

    // Footer
    let footer = Paragraph::new(controls_text(controls_settings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}
