//! Track source: the fixed, ordered playlist and the directory scanner
//! that builds it at startup.

mod display;
mod model;
mod scan;

pub use display::{display_from_fields, format_mmss};
pub use model::{Playlist, Track};
pub use scan::scan;
