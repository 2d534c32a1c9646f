//! Playback interface consumed by the simulation

use crate::library::ClipId;
use crate::settings::PlaybackSettings;

/// Handle to a playing sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(pub u64);

/// Something that can start sounds without blocking the caller.
///
/// `play` on a clip the output does not have is a silent no-op returning `None`.
pub trait AudioOutput {
    /// Start a sound; its lifetime is independent of the caller
    fn play(&mut self, clip: ClipId, settings: &PlaybackSettings) -> Option<PlaybackHandle>;

    /// Housekeeping once per frame (releasing finished sounds)
    fn update(&mut self) {}

    /// Stop one sound, typically a loop
    fn stop(&mut self, _handle: PlaybackHandle) {}

    fn stop_all(&mut self) {}

    /// Sounds still holding an output slot
    fn active_sound_count(&self) -> usize {
        0
    }
}

/// Output used when no audio device is available
#[derive(Debug, Default)]
pub struct NullOutput {
    requests: u64,
}

impl NullOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of play requests swallowed so far
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl AudioOutput for NullOutput {
    fn play(&mut self, clip: ClipId, settings: &PlaybackSettings) -> Option<PlaybackHandle> {
        self.requests += 1;
        log::trace!(
            "Audio disabled, dropping {:?} (volume {:.2}, pitch {:.2})",
            clip,
            settings.volume,
            settings.pitch
        );
        None
    }
}
