//! Audio playback settings

use crate::channel::Channel;
use serde::{Deserialize, Serialize};

/// Whether a sound plays once or repeats until stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    #[default]
    Once,
    Loop,
}

/// Settings for one playback request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Volume (0.0 - 1.0)
    pub volume: f32,
    /// Playback rate; shifts pitch and speed together
    pub pitch: f32,
    /// Once or looping
    pub mode: PlaybackMode,
    /// Mixer channel to play on
    pub channel: Channel,
}

impl PlaybackSettings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set volume
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    /// Set pitch
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch.max(0.1);
        self
    }

    /// Repeat until stopped
    pub fn looping(mut self) -> Self {
        self.mode = PlaybackMode::Loop;
        self
    }

    /// Set channel
    pub fn on_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
            mode: PlaybackMode::Once,
            channel: Channel::Effects,
        }
    }
}
