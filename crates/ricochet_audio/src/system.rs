//! Audio system using rodio

use crate::channel::{Channel, ChannelMixer};
use crate::library::{ClipId, ClipLibrary};
use crate::output::{AudioOutput, PlaybackHandle};
use crate::settings::{PlaybackMode, PlaybackSettings};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::collections::HashMap;

/// Audio error types
#[derive(Debug)]
pub enum AudioError {
    /// Failed to initialize audio device
    DeviceInit(String),
    /// Failed to decode audio data
    LoadError(String),
    /// File not found
    FileNotFound(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceInit(msg) => write!(f, "Failed to initialize audio device: {}", msg),
            Self::LoadError(msg) => write!(f, "Failed to load audio: {}", msg),
            Self::FileNotFound(path) => write!(f, "Audio file not found: {}", path),
        }
    }
}

impl std::error::Error for AudioError {}

/// Internal sound data
struct PlayingSound {
    sink: Sink,
    channel: Channel,
    volume: f32,
    mode: PlaybackMode,
}

/// The audio system
pub struct AudioSystem {
    /// Output stream (must be kept alive)
    _stream: OutputStream,
    /// Stream handle for creating sinks
    stream_handle: OutputStreamHandle,
    /// Decoded clips
    library: ClipLibrary,
    /// Channel volumes
    mixer: ChannelMixer,
    /// Currently playing sounds
    sounds: HashMap<u64, PlayingSound>,
    /// Next handle ID
    next_handle: u64,
}

impl AudioSystem {
    /// Open the default output device
    pub fn new() -> Result<Self, AudioError> {
        Self::with_library(ClipLibrary::new())
    }

    /// Open the default output device with preloaded clips
    pub fn with_library(library: ClipLibrary) -> Result<Self, AudioError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        log::info!("Audio output opened ({} clips loaded)", library.len());

        Ok(Self {
            _stream: stream,
            stream_handle,
            library,
            mixer: ChannelMixer::new(),
            sounds: HashMap::new(),
            next_handle: 1,
        })
    }

    pub fn library(&self) -> &ClipLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut ClipLibrary {
        &mut self.library
    }

    pub fn mixer(&self) -> &ChannelMixer {
        &self.mixer
    }

    /// Set master volume
    pub fn set_master_volume(&mut self, volume: f32) {
        self.mixer.set_master_volume(volume);
        self.refresh_volumes(None);
    }

    /// Set channel volume
    pub fn set_channel_volume(&mut self, channel: Channel, volume: f32) {
        self.mixer.set_volume(channel, volume);
        self.refresh_volumes(Some(channel));
    }

    fn refresh_volumes(&mut self, only: Option<Channel>) {
        for sound in self.sounds.values() {
            if only.map_or(true, |c| c == sound.channel) {
                sound
                    .sink
                    .set_volume(sound.volume * self.mixer.effective_volume(sound.channel));
            }
        }
    }
}

impl AudioOutput for AudioSystem {
    fn play(&mut self, clip: ClipId, settings: &PlaybackSettings) -> Option<PlaybackHandle> {
        let Some(source) = self.library.get(clip).map(|c| c.source()) else {
            log::debug!("Ignoring play request for unknown clip {:?}", clip);
            return None;
        };

        let sink = match Sink::try_new(&self.stream_handle) {
            Ok(sink) => sink,
            Err(e) => {
                log::warn!("Could not create audio sink: {}", e);
                return None;
            }
        };

        sink.set_volume(settings.volume * self.mixer.effective_volume(settings.channel));
        sink.set_speed(settings.pitch);

        match settings.mode {
            PlaybackMode::Once => sink.append(source),
            PlaybackMode::Loop => sink.append(source.repeat_infinite()),
        }

        let handle_id = self.next_handle;
        self.next_handle += 1;

        self.sounds.insert(
            handle_id,
            PlayingSound {
                sink,
                channel: settings.channel,
                volume: settings.volume,
                mode: settings.mode,
            },
        );

        Some(PlaybackHandle(handle_id))
    }

    /// Release sinks that finished playing
    fn update(&mut self) {
        self.sounds.retain(|_, sound| match sound.mode {
            PlaybackMode::Loop => true,
            PlaybackMode::Once => !sound.sink.empty(),
        });
    }

    fn stop(&mut self, handle: PlaybackHandle) {
        if let Some(sound) = self.sounds.remove(&handle.0) {
            sound.sink.stop();
        }
    }

    fn stop_all(&mut self) {
        for (_, sound) in self.sounds.drain() {
            sound.sink.stop();
        }
    }

    fn active_sound_count(&self) -> usize {
        self.sounds.len()
    }
}

// AudioSystem has no Default: opening the device can fail
