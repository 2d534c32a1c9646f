//! Mixer channels

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mixer channel a sound plays on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Impacts and other one-shots
    #[default]
    Effects,
    /// Character voice lines
    Voice,
    /// Background loops
    Ambience,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Effects, Channel::Voice, Channel::Ambience];
}

#[derive(Debug, Clone, Copy)]
struct ChannelState {
    volume: f32,
    muted: bool,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
        }
    }
}

/// Per-channel and master volume
#[derive(Debug, Clone)]
pub struct ChannelMixer {
    channels: HashMap<Channel, ChannelState>,
    master_volume: f32,
    master_muted: bool,
}

impl ChannelMixer {
    /// Create a mixer with every channel at full volume
    pub fn new() -> Self {
        Self {
            channels: Channel::ALL
                .iter()
                .map(|&c| (c, ChannelState::default()))
                .collect(),
            master_volume: 1.0,
            master_muted: false,
        }
    }

    /// Set master volume
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    /// Get master volume
    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Mute/unmute everything
    pub fn set_master_muted(&mut self, muted: bool) {
        self.master_muted = muted;
    }

    /// Set channel volume
    pub fn set_volume(&mut self, channel: Channel, volume: f32) {
        self.channels.entry(channel).or_default().volume = volume.clamp(0.0, 1.0);
    }

    /// Mute/unmute a channel
    pub fn set_muted(&mut self, channel: Channel, muted: bool) {
        self.channels.entry(channel).or_default().muted = muted;
    }

    /// Gain applied on top of a sound's own volume
    pub fn effective_volume(&self, channel: Channel) -> f32 {
        if self.master_muted {
            return 0.0;
        }
        let state = self.channels.get(&channel).copied().unwrap_or_default();
        if state.muted {
            0.0
        } else {
            state.volume * self.master_volume
        }
    }
}

impl Default for ChannelMixer {
    fn default() -> Self {
        Self::new()
    }
}
