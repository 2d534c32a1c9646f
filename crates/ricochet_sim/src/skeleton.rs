//! Reference skeleton and keyframe animation
//!
//! A small in-memory stand-in for the asset collaborator: bones with a rest
//! pose, keyframed translation/rotation tracks, and a player that samples
//! them. Real models only need to implement [`BoneSource`] and [`Animated`].

use crate::error::{Result, SimError};
use crate::scene::{Animated, BoneId, BoneSource};
use glam::{Mat4, Quat, Vec3};
use std::collections::BTreeMap;

/// Local transform of a bone relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BonePose {
    /// Offset from the parent bone
    pub translation: Vec3,
    /// Rotation relative to the parent bone
    pub rotation: Quat,
}

impl BonePose {
    /// Pose from a translation and rotation
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Pure offset, no rotation
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}

/// Bone hierarchy with its rest pose
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    names: Vec<String>,
    parents: Vec<Option<BoneId>>,
    rest: Vec<BonePose>,
}

impl Skeleton {
    /// Skeleton with no bones
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bone. The parent must already exist.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<BoneId>,
        rest: BonePose,
    ) -> Result<BoneId> {
        if let Some(p) = parent {
            if p.index() >= self.names.len() {
                return Err(SimError::UnknownBone(p));
            }
        }
        let id = BoneId(self.names.len() as u32);
        self.names.push(name.into());
        self.parents.push(parent);
        self.rest.push(rest);
        Ok(id)
    }

    /// Number of bones
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are no bones
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of a bone
    pub fn name(&self, bone: BoneId) -> Option<&str> {
        self.names.get(bone.index()).map(String::as_str)
    }

    /// Parent of a bone; `None` for roots
    pub fn parent(&self, bone: BoneId) -> Option<BoneId> {
        self.parents.get(bone.index()).copied().flatten()
    }

    /// Bone with the given name
    pub fn find(&self, name: &str) -> Option<BoneId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| BoneId(i as u32))
    }

    /// Depth-first traversal, parents before children
    pub fn depth_first(&self) -> Vec<BoneId> {
        let mut children: Vec<Vec<BoneId>> = vec![Vec::new(); self.len()];
        let mut roots = Vec::new();
        for (i, parent) in self.parents.iter().enumerate() {
            let id = BoneId(i as u32);
            match parent {
                Some(p) => children[p.index()].push(id),
                None => roots.push(id),
            }
        }

        let mut order = Vec::with_capacity(self.len());
        let mut stack: Vec<BoneId> = roots.into_iter().rev().collect();
        while let Some(bone) = stack.pop() {
            order.push(bone);
            stack.extend(children[bone.index()].iter().rev());
        }
        order
    }
}

/// Keyframed vector track
#[derive(Debug, Clone, Default)]
pub struct TrackVec3 {
    /// Key times in seconds, ascending
    pub times: Vec<f32>,
    /// Value at each key
    pub values: Vec<Vec3>,
}

/// Keyframed rotation track
#[derive(Debug, Clone, Default)]
pub struct TrackQuat {
    /// Key times in seconds, ascending
    pub times: Vec<f32>,
    /// Value at each key
    pub values: Vec<Quat>,
}

/// Index of the key pair around `t` and the blend factor between them
fn bracket(times: &[f32], t: f32) -> Option<(usize, usize, f32)> {
    let last = times.len().checked_sub(1)?;
    if t <= times[0] {
        return Some((0, 0, 0.0));
    }
    if t >= times[last] {
        return Some((last, last, 0.0));
    }
    let i = times.windows(2).position(|w| t >= w[0] && t <= w[1])?;
    let span = times[i + 1] - times[i];
    let f = if span > 0.0 { (t - times[i]) / span } else { 0.0 };
    Some((i, i + 1, f))
}

impl TrackVec3 {
    /// Interpolated value at `t`, or `default` with no keys
    pub fn sample(&self, t: f32, default: Vec3) -> Vec3 {
        match bracket(&self.times, t) {
            Some((a, b, f)) if b < self.values.len() => self.values[a].lerp(self.values[b], f),
            _ => default,
        }
    }
}

impl TrackQuat {
    /// Interpolated rotation at `t`, or `default` with no keys
    pub fn sample(&self, t: f32, default: Quat) -> Quat {
        match bracket(&self.times, t) {
            Some((a, b, f)) if b < self.values.len() => self.values[a].slerp(self.values[b], f),
            _ => default,
        }
    }
}

/// Named set of bone tracks
#[derive(Debug, Clone, Default)]
pub struct AnimationClip {
    /// Clip name, for logs
    pub name: String,
    /// Length in seconds
    pub duration: f32,
    /// Translation tracks by bone
    pub translations: BTreeMap<BoneId, TrackVec3>,
    /// Rotation tracks by bone
    pub rotations: BTreeMap<BoneId, TrackQuat>,
}

impl AnimationClip {
    /// Empty clip
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            ..Default::default()
        }
    }

    /// Add a translation track
    pub fn with_translation(mut self, bone: BoneId, track: TrackVec3) -> Self {
        self.translations.insert(bone, track);
        self
    }

    /// Add a rotation track
    pub fn with_rotation(mut self, bone: BoneId, track: TrackQuat) -> Self {
        self.rotations.insert(bone, track);
        self
    }

    /// Local poses at time `t`, starting from the rest pose
    pub fn sample(&self, skeleton: &Skeleton, t: f32) -> Vec<BonePose> {
        let mut poses = skeleton.rest.clone();
        for (bone, track) in &self.translations {
            if let Some(pose) = poses.get_mut(bone.index()) {
                pose.translation = track.sample(t, pose.translation);
            }
        }
        for (bone, track) in &self.rotations {
            if let Some(pose) = poses.get_mut(bone.index()) {
                pose.rotation = track.sample(t, pose.rotation);
            }
        }
        poses
    }
}

/// Playback position within a clip
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    clip: Option<AnimationClip>,
    time: f32,
    speed: f32,
    looping: bool,
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self {
            clip: None,
            time: 0.0,
            speed: 1.0,
            looping: true,
        }
    }
}

impl AnimationPlayer {
    /// Player with no clip, looping at normal speed
    pub fn new() -> Self {
        Self::default()
    }

    /// Start playing a clip from the beginning
    pub fn play(&mut self, clip: AnimationClip) {
        log::debug!("Playing animation '{}' ({:.2}s)", clip.name, clip.duration);
        self.clip = Some(clip);
        self.time = 0.0;
    }

    /// Playback rate multiplier
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Wrap at the end of the clip
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Wrap at the end of the clip
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Clip being played
    pub fn clip(&self) -> Option<&AnimationClip> {
        self.clip.as_ref()
    }

    /// Playhead in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Move the playhead; wraps when looping, holds the last frame otherwise
    pub fn advance(&mut self, dt: f32) {
        let Some(clip) = &self.clip else {
            return;
        };
        self.time += dt * self.speed;
        if clip.duration <= 0.0 {
            self.time = 0.0;
        } else if self.looping {
            self.time = self.time.rem_euclid(clip.duration);
        } else {
            self.time = self.time.clamp(0.0, clip.duration);
        }
    }

    /// Local poses for the current playhead
    pub fn sample(&self, skeleton: &Skeleton) -> Vec<BonePose> {
        match &self.clip {
            Some(clip) => clip.sample(skeleton, self.time),
            None => skeleton.rest.clone(),
        }
    }
}

/// A placed skeleton with a player driving it
#[derive(Debug, Clone)]
pub struct AnimatedSkeleton {
    skeleton: Skeleton,
    player: AnimationPlayer,
    placement: Mat4,
    /// World matrices for the current pose
    globals: Vec<Mat4>,
}

impl AnimatedSkeleton {
    /// Skeleton at the origin in its rest pose
    pub fn new(skeleton: Skeleton) -> Self {
        let mut model = Self {
            skeleton,
            player: AnimationPlayer::new(),
            placement: Mat4::IDENTITY,
            globals: Vec::new(),
        };
        model.refresh();
        model
    }

    /// Place the model in the world
    pub fn with_placement(mut self, position: Vec3, rotation: Quat) -> Self {
        self.placement = Mat4::from_rotation_translation(rotation, position);
        self.refresh();
        self
    }

    /// Start playing a clip
    pub fn with_animation(mut self, clip: AnimationClip) -> Self {
        self.player.play(clip);
        self.refresh();
        self
    }

    /// Bone hierarchy
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Animation playback
    pub fn player(&self) -> &AnimationPlayer {
        &self.player
    }

    /// Animation playback, for speed and looping
    pub fn player_mut(&mut self) -> &mut AnimationPlayer {
        &mut self.player
    }

    fn refresh(&mut self) {
        let locals = self.player.sample(&self.skeleton);
        let mut globals: Vec<Mat4> = Vec::with_capacity(locals.len());
        // Parents always precede children, so one forward pass suffices
        for (i, local) in locals.iter().enumerate() {
            let parent = self.skeleton.parents[i]
                .and_then(|p| globals.get(p.index()).copied())
                .unwrap_or(self.placement);
            globals.push(parent * local.matrix());
        }
        self.globals = globals;
    }
}

impl BoneSource for AnimatedSkeleton {
    fn bones(&self) -> Vec<BoneId> {
        self.skeleton.depth_first()
    }

    fn bone_world_position(&self, bone: BoneId) -> Option<Vec3> {
        self.globals
            .get(bone.index())
            .map(|m| m.transform_point3(Vec3::ZERO))
    }
}

impl Animated for AnimatedSkeleton {
    fn advance(&mut self, dt: f32) {
        self.player.advance(dt);
        self.refresh();
    }
}
