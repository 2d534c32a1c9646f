//! Event to audio dispatch
//!
//! Turns bounce events into impact sounds shaped by distance and speed, and
//! into character voice lines when a bounce lands near a character's bones.

use crate::character::{CharacterId, CharacterRegistry};
use crate::config::{BounceAudioConfig, VoiceConfig};
use crate::projectile::BounceEvent;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ricochet_audio::{AudioOutput, Channel, ClipId, PlaybackHandle, PlaybackSettings};
use ricochet_physics::PhysicsWorld;

/// Plays sounds for simulation events
#[derive(Debug)]
pub struct AudioDispatcher {
    bounce: BounceAudioConfig,
    voice: VoiceConfig,
    bounce_clip: Option<ClipId>,
    rng: ChaCha8Rng,
}

impl AudioDispatcher {
    /// Dispatcher with its own seeded pitch and voice randomness
    pub fn new(bounce: BounceAudioConfig, voice: VoiceConfig, seed: u64) -> Self {
        Self {
            bounce,
            voice,
            bounce_clip: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Clip played on every bounce
    pub fn with_bounce_clip(mut self, clip: ClipId) -> Self {
        self.bounce_clip = Some(clip);
        self
    }

    /// Replace or clear the bounce clip
    pub fn set_bounce_clip(&mut self, clip: Option<ClipId>) {
        self.bounce_clip = clip;
    }

    /// Clip played on every bounce
    pub fn bounce_clip(&self) -> Option<ClipId> {
        self.bounce_clip
    }

    // ==================== Bounce shaping ====================

    /// Linear falloff with distance, floored at `min_volume`
    pub fn distance_gain(&self, distance: f32) -> f32 {
        let falloff = 1.0 - distance / self.bounce.max_audible_distance;
        falloff.max(self.bounce.min_volume)
    }

    fn normalized_speed(&self, speed: f32) -> f32 {
        (speed / self.bounce.speed_normalization).clamp(0.0, 1.0)
    }

    /// 0.3 at rest up to 1.0 at `speed_normalization`
    pub fn speed_factor(&self, speed: f32) -> f32 {
        0.3 + 0.7 * self.normalized_speed(speed)
    }

    /// Distance gain times speed factor
    pub fn bounce_volume(&self, distance: f32, speed: f32) -> f32 {
        self.distance_gain(distance) * self.speed_factor(speed)
    }

    /// Pitch before jitter, mapped linearly into the pitch range
    pub fn bounce_pitch(&self, speed: f32) -> f32 {
        let BounceAudioConfig {
            pitch_min,
            pitch_max,
            ..
        } = self.bounce;
        pitch_min + (pitch_max - pitch_min) * self.normalized_speed(speed)
    }

    fn jitter(&mut self) -> f32 {
        let j = self.bounce.pitch_jitter;
        if j > 0.0 {
            self.rng.random_range(1.0 - j..=1.0 + j)
        } else {
            1.0
        }
    }

    // ==================== Dispatch ====================

    /// Play the impact sound for a bounce heard from `listener`
    pub fn on_bounce(
        &mut self,
        event: &BounceEvent,
        listener: Vec3,
        output: &mut dyn AudioOutput,
    ) -> Option<PlaybackHandle> {
        let clip = self.bounce_clip?;
        let speed = event.velocity.length();
        let volume = self.bounce_volume(listener.distance(event.position), speed);
        let pitch = self.bounce_pitch(speed) * self.jitter();

        log::debug!(
            "Bounce of {:?} at {:?}: volume {:.2}, pitch {:.2}",
            event.projectile,
            event.position,
            volume,
            pitch
        );

        let settings = PlaybackSettings::new()
            .with_volume(volume)
            .with_pitch(pitch)
            .on_channel(Channel::Effects);
        output.play(clip, &settings)
    }

    /// Let every character whose bones are near the bounce react.
    ///
    /// A character speaks at most once per event, only when its cooldown has
    /// run out and it has voice lines. Returns the characters that spoke.
    pub fn on_character_proximity(
        &mut self,
        event: &BounceEvent,
        characters: &mut CharacterRegistry,
        world: &PhysicsWorld,
        output: &mut dyn AudioOutput,
    ) -> Vec<CharacterId> {
        let hit_radius = self.voice.hit_radius;
        let mut spoke = Vec::new();

        for character in characters.iter_mut() {
            if character.voices().is_empty() || !character.cooldown().is_ready() {
                continue;
            }

            let hit = character.proxies().iter().any(|proxy| {
                world
                    .body_position(proxy.body)
                    .map(|p| p.distance(event.position) <= hit_radius)
                    .unwrap_or(false)
            });
            if !hit {
                continue;
            }

            let index = self.rng.random_range(0..character.voices().len());
            let clip = character.voices()[index];
            let settings = PlaybackSettings::new().on_channel(Channel::Voice);
            // Stays ready if the line could not be played
            if output.play(clip, &settings).is_none() {
                log::trace!("Voice line {:?} for '{}' not played", clip, character.name());
                continue;
            }
            character.cooldown_mut().reset(self.voice.cooldown);

            log::debug!(
                "Character '{}' hit by {:?}, playing voice line {:?}",
                character.name(),
                event.projectile,
                clip
            );
            spoke.push(character.id());
        }

        spoke
    }
}
