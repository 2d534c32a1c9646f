//! Ricochet Audio - Audio Playback
//!
//! This crate provides fire-and-forget audio playback using rodio.
//!
//! # Features
//!
//! - Decoded clip library (clips are decoded once, replayed cheaply)
//! - One-shot and looping playback with volume and pitch
//! - Mixer channels (effects, voice, ambience) with independent volume
//! - `AudioOutput` trait so the simulation never depends on a sound device
//!
//! # Example
//!
//! ```ignore
//! use ricochet_audio::prelude::*;
//!
//! let mut audio = AudioSystem::new()?;
//! let bounce = audio.library_mut().load_file("assets/bounce.wav")?;
//!
//! audio.play(bounce, &PlaybackSettings::new().with_volume(0.6).with_pitch(1.1));
//! ```

pub mod channel;
pub mod library;
pub mod output;
pub mod settings;
pub mod system;

pub mod prelude {
    pub use crate::channel::{Channel, ChannelMixer};
    pub use crate::library::{AudioClip, ClipId, ClipLibrary};
    pub use crate::output::{AudioOutput, NullOutput, PlaybackHandle};
    pub use crate::settings::{PlaybackMode, PlaybackSettings};
    pub use crate::system::{AudioError, AudioSystem};
}

pub use prelude::*;
