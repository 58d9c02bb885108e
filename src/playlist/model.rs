use std::path::PathBuf;
use std::time::Duration;

/// One playable audio item and its scan-time metadata.
#[derive(Clone)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Total length, when the metadata reader could determine it.
    pub duration: Option<Duration>,
    pub display: String,
}

/// An ordered collection of tracks, fixed after startup.
///
/// The transport only ever selects tracks by index; it never adds,
/// removes or reorders them.
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }
}
