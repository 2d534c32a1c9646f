//! Shared fixtures for simulation integration tests

#![allow(dead_code)]

use glam::Vec3;
use ricochet_audio::{AudioOutput, Channel, ClipId, PlaybackHandle, PlaybackSettings};
use ricochet_sim::{Animated, BoneId, BoneSource};

/// Records every play request
#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub played: Vec<(ClipId, PlaybackSettings)>,
    pub updates: usize,
}

impl RecordingOutput {
    pub fn on_channel(&self, channel: Channel) -> Vec<ClipId> {
        self.played
            .iter()
            .filter(|(_, s)| s.channel == channel)
            .map(|(clip, _)| *clip)
            .collect()
    }
}

impl AudioOutput for RecordingOutput {
    fn play(&mut self, clip: ClipId, settings: &PlaybackSettings) -> Option<PlaybackHandle> {
        self.played.push((clip, settings.clone()));
        Some(PlaybackHandle(self.played.len() as u64))
    }

    fn update(&mut self) {
        self.updates += 1;
    }
}

/// Loose bones translating at a constant velocity
#[derive(Debug, Clone)]
pub struct DriftingBones {
    pub positions: Vec<Vec3>,
    pub velocity: Vec3,
}

impl DriftingBones {
    pub fn at(positions: &[Vec3]) -> Self {
        Self {
            positions: positions.to_vec(),
            velocity: Vec3::ZERO,
        }
    }

    pub fn drifting(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }
}

impl BoneSource for DriftingBones {
    fn bones(&self) -> Vec<BoneId> {
        (0..self.positions.len() as u32).map(BoneId).collect()
    }

    fn bone_world_position(&self, bone: BoneId) -> Option<Vec3> {
        self.positions.get(bone.index()).copied()
    }
}

impl Animated for DriftingBones {
    fn advance(&mut self, dt: f32) {
        for p in &mut self.positions {
            *p += self.velocity * dt;
        }
    }
}

/// 20x20 floor quad at y = 0
pub fn floor() -> (Vec<f32>, Vec<u32>) {
    let vertices = vec![
        -10.0, 0.0, -10.0, //
        10.0, 0.0, -10.0, //
        10.0, 0.0, 10.0, //
        -10.0, 0.0, 10.0,
    ];
    (vertices, vec![0, 2, 1, 0, 3, 2])
}
