use std::path::Path;
use std::time::Duration;

use crate::config::TrackDisplayField;

/// Format a `Duration` as `M:SS`, the shape shown next to the progress line.
pub fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Build a display string for a track from the configured `fields`, joined
/// with `sep`. Falls back to `title` when no field produced anything.
pub fn display_from_fields(
    path: &Path,
    title: &str,
    artist: Option<&str>,
    album: Option<&str>,
    fields: &[TrackDisplayField],
    sep: &str,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    let mut push_nonempty = |s: &str, parts: &mut Vec<String>| {
        let s = s.trim();
        if !s.is_empty() {
            parts.push(s.to_string());
        }
    };

    for f in fields {
        match f {
            TrackDisplayField::Display => {
                // "display" used as a field means the default "artist - title".
                if let Some(a) = artist {
                    push_nonempty(a, &mut parts);
                }
                push_nonempty(title, &mut parts);
            }
            TrackDisplayField::Title => push_nonempty(title, &mut parts),
            TrackDisplayField::Artist => {
                if let Some(a) = artist {
                    push_nonempty(a, &mut parts);
                }
            }
            TrackDisplayField::Album => {
                if let Some(a) = album {
                    push_nonempty(a, &mut parts);
                }
            }
            TrackDisplayField::Filename => {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    push_nonempty(stem, &mut parts);
                }
            }
            TrackDisplayField::Path => parts.push(path.display().to_string()),
        }
    }

    if parts.is_empty() {
        title.to_string()
    } else {
        parts.join(sep)
    }
}
