//! Movement controller
//!
//! Held keys move the camera along its horizontal heading, independent of
//! pitch and gravity. Input only applies while the pointer is locked.

use crate::camera::CameraPose;
use crate::config::MovementConfig;
use glam::Vec3;
use std::collections::BTreeSet;

/// Movement keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveKey {
    /// Along the horizontal heading
    Forward,
    Back,
    /// Strafe
    Left,
    Right,
    /// Straight up the world axis
    Up,
    Down,
}

/// Which movement keys are held
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyState {
    held: BTreeSet<MoveKey>,
}

impl KeyState {
    /// Nothing held
    pub fn new() -> Self {
        Self::default()
    }

    /// State with the given keys held
    pub fn holding(keys: &[MoveKey]) -> Self {
        Self {
            held: keys.iter().copied().collect(),
        }
    }

    /// Mark a key as held
    pub fn press(&mut self, key: MoveKey) {
        self.held.insert(key);
    }

    /// Mark a key as released
    pub fn release(&mut self, key: MoveKey) {
        self.held.remove(&key);
    }

    /// Press or release a key
    pub fn set(&mut self, key: MoveKey, pressed: bool) {
        if pressed {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    /// Whether a key is held
    pub fn is_held(&self, key: MoveKey) -> bool {
        self.held.contains(&key)
    }

    /// Release every key
    pub fn clear(&mut self) {
        self.held.clear();
    }

    fn axis(&self, positive: MoveKey, negative: MoveKey) -> f32 {
        (self.is_held(positive) as i32 - self.is_held(negative) as i32) as f32
    }

    /// Unit or zero direction: x = right, y = up, z = forward
    pub fn local_direction(&self) -> Vec3 {
        Vec3::new(
            self.axis(MoveKey::Right, MoveKey::Left),
            self.axis(MoveKey::Up, MoveKey::Down),
            self.axis(MoveKey::Forward, MoveKey::Back),
        )
        .normalize_or_zero()
    }
}

/// Pointer capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerLock {
    #[default]
    /// Pointer free; movement ignored
    Unlocked,
    /// Pointer captured by the view
    Locked,
}

/// Result of one movement update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveOutcome {
    /// Unlocked or nothing held
    #[default]
    Idle,
    /// Camera position changed
    Moved,
    /// The move would have left the walking radius
    Blocked,
}

/// Forward on the ground plane. Falls back to the camera's up vector when
/// looking straight up or down.
pub fn horizontal_forward(orientation: glam::Quat) -> Vec3 {
    let forward = orientation * Vec3::NEG_Z;
    let flat = Vec3::new(forward.x, 0.0, forward.z);
    if flat.length_squared() > 1e-6 {
        return flat.normalize();
    }

    // Looking up, the camera's up points backwards
    let up = orientation * Vec3::Y;
    let up = if forward.y > 0.0 { -up } else { up };
    Vec3::new(up.x, 0.0, up.z)
        .try_normalize()
        .unwrap_or(Vec3::NEG_Z)
}

/// Horizontal distance between two points
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let d = a - b;
    Vec3::new(d.x, 0.0, d.z).length()
}

/// Applies held keys to a camera
#[derive(Debug, Clone)]
pub struct MovementController {
    config: MovementConfig,
    lock: PointerLock,
}

impl MovementController {
    /// Controller with the pointer released
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            lock: PointerLock::Unlocked,
        }
    }

    /// Speed and bounds in use
    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Capture the pointer
    pub fn lock(&mut self) {
        if self.lock != PointerLock::Locked {
            log::debug!("Pointer locked");
        }
        self.lock = PointerLock::Locked;
    }

    /// Release the pointer
    pub fn unlock(&mut self) {
        if self.lock != PointerLock::Unlocked {
            log::debug!("Pointer released");
        }
        self.lock = PointerLock::Unlocked;
    }

    /// Flip the pointer capture
    pub fn toggle_lock(&mut self) {
        match self.lock {
            PointerLock::Locked => self.unlock(),
            PointerLock::Unlocked => self.lock(),
        }
    }

    /// Current pointer capture
    pub fn pointer_lock(&self) -> PointerLock {
        self.lock
    }

    /// Whether input moves the camera
    pub fn is_locked(&self) -> bool {
        self.lock == PointerLock::Locked
    }

    /// World-space displacement for the held keys, ignoring lock and bounds
    pub fn displacement(&self, keys: &KeyState, orientation: glam::Quat, dt: f32) -> Vec3 {
        let local = keys.local_direction();
        if local == Vec3::ZERO {
            return Vec3::ZERO;
        }

        let forward = horizontal_forward(orientation);
        let right = forward.cross(Vec3::Y);
        (forward * local.z + right * local.x + Vec3::Y * local.y) * self.config.move_speed * dt
    }

    /// Move the camera if locked. A move that would end outside the walking
    /// radius is dropped entirely.
    pub fn update(&self, keys: &KeyState, camera: &mut CameraPose, dt: f32) -> MoveOutcome {
        if !self.is_locked() {
            return MoveOutcome::Idle;
        }

        let delta = self.displacement(keys, camera.orientation, dt);
        if delta == Vec3::ZERO {
            return MoveOutcome::Idle;
        }

        let candidate = camera.position + delta;
        if let Some(radius) = self.config.walk_radius {
            if horizontal_distance(candidate, self.config.anchor()) > radius {
                log::trace!("Move to {:?} blocked by walking radius", candidate);
                return MoveOutcome::Blocked;
            }
        }

        camera.position = candidate;
        MoveOutcome::Moved
    }
}
