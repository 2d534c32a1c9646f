//! Simulation tunables

use crate::error::{Result, SimError};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera movement settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Units per second
    pub move_speed: f32,
    /// Horizontal walking bound around `anchor`; `None` disables it
    pub walk_radius: Option<f32>,
    /// Centre of the walking bound
    pub anchor: [f32; 3],
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            walk_radius: Some(10.0),
            anchor: [0.0, 0.0, 0.0],
        }
    }
}

impl MovementConfig {
    /// Centre of the walking area
    pub fn anchor(&self) -> Vec3 {
        Vec3::from(self.anchor)
    }
}

/// Projectile settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Launch speed
    pub speed: f32,
    /// Sphere radius
    pub radius: f32,
    /// Bounciness (0-1)
    pub restitution: f32,
    /// Spawn distance in front of the camera
    pub spawn_offset: f32,
    /// Live projectile cap; the oldest is evicted first
    pub max_live: usize,
    /// Seconds before a projectile is removed
    pub max_age: f32,
    /// Projectiles below this height are removed
    pub kill_height: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 15.0,
            radius: 0.1,
            restitution: 0.8,
            spawn_offset: 0.5,
            max_live: 64,
            max_age: 10.0,
            kill_height: -50.0,
        }
    }
}

/// Bounce sound shaping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceAudioConfig {
    /// Distance at which the distance gain reaches zero (before the floor)
    pub max_audible_distance: f32,
    /// Distance gain floor
    pub min_volume: f32,
    /// Speed that maps to full volume and maximum pitch
    pub speed_normalization: f32,
    /// Playback rate of the slowest bounce
    pub pitch_min: f32,
    /// Playback rate of the fastest bounce
    pub pitch_max: f32,
    /// Relative random pitch variation; 0 disables
    pub pitch_jitter: f32,
}

impl Default for BounceAudioConfig {
    fn default() -> Self {
        Self {
            max_audible_distance: 10.0,
            min_volume: 0.05,
            speed_normalization: 20.0,
            pitch_min: 0.8,
            pitch_max: 1.2,
            pitch_jitter: 0.03,
        }
    }
}

/// Character voice reactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Bounce-to-bone distance that counts as a hit
    pub hit_radius: f32,
    /// Seconds between two voice lines of one character
    pub cooldown: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            hit_radius: 0.5,
            cooldown: 2.0,
        }
    }
}

/// Bone proxy settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Sphere radius of every bone collider
    pub bone_radius: f32,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self { bone_radius: 0.05 }
    }
}

/// Everything the frame loop needs besides physics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Camera movement
    pub movement: MovementConfig,
    /// Projectile spawning and retirement
    pub projectiles: ProjectileConfig,
    /// Bounce volume and pitch mapping
    pub bounce_audio: BounceAudioConfig,
    /// Character voice lines
    pub voice: VoiceConfig,
    /// Bone collider sizing
    pub rig: RigConfig,
    /// Restitution of environment meshes
    pub environment_restitution: f32,
    /// Velocity change that counts as a bounce
    pub bounce_threshold: f32,
    /// Local-right offset of the second camera in split view
    pub split_offset: f32,
    /// Frame times above this are clamped
    pub max_frame_delta: f32,
    /// Seed for pitch jitter and voice selection
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            projectiles: ProjectileConfig::default(),
            bounce_audio: BounceAudioConfig::default(),
            voice: VoiceConfig::default(),
            rig: RigConfig::default(),
            environment_restitution: 0.6,
            bounce_threshold: 2.0,
            split_offset: 0.064,
            max_frame_delta: 0.1,
            seed: 0x5EED,
        }
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!("{} must be positive, got {}", name, value)))
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!("{} must not be negative, got {}", name, value)))
    }
}

impl SimConfig {
    /// Reject values the frame loop cannot work with
    pub fn validate(&self) -> Result<()> {
        positive("movement.move_speed", self.movement.move_speed)?;
        if let Some(radius) = self.movement.walk_radius {
            positive("movement.walk_radius", radius)?;
        }

        let p = &self.projectiles;
        positive("projectiles.speed", p.speed)?;
        positive("projectiles.radius", p.radius)?;
        positive("projectiles.max_age", p.max_age)?;
        non_negative("projectiles.restitution", p.restitution)?;
        non_negative("projectiles.spawn_offset", p.spawn_offset)?;
        if p.max_live == 0 {
            return Err(SimError::InvalidConfig("projectiles.max_live must be at least 1".into()));
        }

        let a = &self.bounce_audio;
        positive("bounce_audio.max_audible_distance", a.max_audible_distance)?;
        positive("bounce_audio.speed_normalization", a.speed_normalization)?;
        positive("bounce_audio.pitch_min", a.pitch_min)?;
        non_negative("bounce_audio.min_volume", a.min_volume)?;
        if a.pitch_max < a.pitch_min {
            return Err(SimError::InvalidConfig(format!(
                "bounce_audio pitch range is inverted ({} > {})",
                a.pitch_min, a.pitch_max
            )));
        }
        if !(0.0..1.0).contains(&a.pitch_jitter) {
            return Err(SimError::InvalidConfig(format!(
                "bounce_audio.pitch_jitter must be in [0, 1), got {}",
                a.pitch_jitter
            )));
        }

        non_negative("voice.hit_radius", self.voice.hit_radius)?;
        non_negative("voice.cooldown", self.voice.cooldown)?;
        positive("rig.bone_radius", self.rig.bone_radius)?;
        non_negative("environment_restitution", self.environment_restitution)?;
        non_negative("bounce_threshold", self.bounce_threshold)?;
        positive("max_frame_delta", self.max_frame_delta)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_pitch() {
        let mut config = SimConfig::default();
        config.bounce_audio.pitch_min = 1.5;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_speed() {
        let mut config = SimConfig::default();
        config.movement.move_speed = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.projectiles.max_live = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unbounded_walking_is_valid() {
        let mut config = SimConfig::default();
        config.movement.walk_radius = None;
        assert!(config.validate().is_ok());
    }
}
