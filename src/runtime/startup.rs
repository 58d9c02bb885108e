use crate::config::{RepeatSetting, Settings};
use crate::engine::PlaybackEngine;
use crate::transport::{RepeatPhase, Transport};

/// Seed the transport with the configured playback defaults. Nothing starts
/// playing until the user asks.
pub fn apply_playback_defaults<E: PlaybackEngine>(transport: &mut Transport<E>, settings: &Settings) {
    transport.set_shuffle(settings.playback.shuffle);
    transport.set_repeat(match settings.playback.repeat {
        RepeatSetting::None => RepeatPhase::None,
        RepeatSetting::One => RepeatPhase::One,
        RepeatSetting::All => RepeatPhase::All,
    });
    transport.set_wrap_autoplay(settings.playback.wrap_autoplay);
    transport.set_volume(settings.playback.volume);
}
