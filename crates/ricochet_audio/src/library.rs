//! Decoded audio clips

use crate::system::AudioError;
use rodio::source::Buffered;
use rodio::{Decoder, Source};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// Decoded, shareable sample stream. Cloning is cheap.
pub type DecodedSource = Buffered<Decoder<Cursor<Vec<u8>>>>;

/// Identifier of a clip in a `ClipLibrary`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId(pub u32);

/// A decoded clip ready for playback
pub struct AudioClip {
    name: String,
    source: DecodedSource,
    channels: u16,
    sample_rate: u32,
    duration: Option<Duration>,
}

impl AudioClip {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of the clip, when the format reports it
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Fresh playback stream over the shared decoded samples
    pub fn source(&self) -> DecodedSource {
        self.source.clone()
    }
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("name", &self.name)
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .field("duration", &self.duration)
            .finish()
    }
}

/// Clips keyed by id, with a name index
#[derive(Debug, Default)]
pub struct ClipLibrary {
    clips: HashMap<ClipId, AudioClip>,
    names: HashMap<String, ClipId>,
    next_id: u32,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an in-memory encoded clip (wav, mp3 or ogg vorbis).
    ///
    /// Re-inserting an existing name replaces the clip under the same id.
    pub fn insert_bytes(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<ClipId, AudioError> {
        let name = name.into();
        let decoder = Decoder::new(Cursor::new(bytes))
            .map_err(|e| AudioError::LoadError(format!("{}: {}", name, e)))?;

        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let duration = decoder.total_duration();

        let id = match self.names.get(&name) {
            Some(&existing) => existing,
            None => {
                let id = ClipId(self.next_id);
                self.next_id += 1;
                self.names.insert(name.clone(), id);
                id
            }
        };

        log::debug!(
            "Decoded clip '{}' ({} ch, {} Hz, {:?})",
            name,
            channels,
            sample_rate,
            duration
        );

        self.clips.insert(
            id,
            AudioClip {
                name,
                source: decoder.buffered(),
                channels,
                sample_rate,
                duration,
            },
        );
        Ok(id)
    }

    /// Read and decode a clip file; the clip is named after the file stem
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<ClipId, AudioError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|_| AudioError::FileNotFound(path.display().to_string()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.insert_bytes(name, bytes)
    }

    pub fn get(&self, id: ClipId) -> Option<&AudioClip> {
        self.clips.get(&id)
    }

    /// Look a clip up by name
    pub fn find(&self, name: &str) -> Option<ClipId> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
