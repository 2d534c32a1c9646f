//! Camera poses and the optional split view

use glam::{EulerRot, Quat, Vec3};

/// Furthest mouse look can tilt the view up or down, in radians
pub const PITCH_LIMIT: f32 = 1.5;

/// Position and orientation of a camera. Looks down local -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Eye position in world space
    pub position: Vec3,
    /// World rotation of the view
    pub orientation: Quat,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl CameraPose {
    /// Create a pose from a position and orientation
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose from yaw (about world up) and pitch (about local right), in radians
    pub fn from_yaw_pitch(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self::new(position, Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0))
    }

    /// Pose at `position` facing `target`, without roll
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let Some(dir) = (target - position).try_normalize() else {
            return Self::new(position, Quat::IDENTITY);
        };
        let yaw = (-dir.x).atan2(-dir.z);
        let pitch = dir.y.clamp(-1.0, 1.0).asin();
        Self::from_yaw_pitch(position, yaw, pitch)
    }

    /// View direction
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// Camera-space +X in world space
    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// Camera-space +Y in world space
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Elevation of the view direction above the horizon, in radians
    pub fn pitch(&self) -> f32 {
        self.forward().y.clamp(-1.0, 1.0).asin()
    }

    /// Mouse look: yaw about world up, pitch about the camera's right.
    ///
    /// The resulting pitch stays within [`PITCH_LIMIT`] so the view never
    /// tips over the vertical.
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        let current = self.pitch();
        let delta = (current + pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT) - current;
        self.orientation =
            (Quat::from_rotation_y(yaw) * self.orientation * Quat::from_rotation_x(delta)).normalize();
    }
}

/// Primary camera plus an optional second view offset to its right
#[derive(Debug, Clone)]
pub struct CameraRig {
    primary: CameraPose,
    split_offset: Option<f32>,
    secondary: Option<CameraPose>,
}

impl CameraRig {
    /// Single-view rig around `primary`
    pub fn new(primary: CameraPose) -> Self {
        Self {
            primary,
            split_offset: None,
            secondary: None,
        }
    }

    /// Main view
    pub fn primary(&self) -> &CameraPose {
        &self.primary
    }

    /// Main view, for movement and look
    pub fn primary_mut(&mut self) -> &mut CameraPose {
        &mut self.primary
    }

    /// Second view, present only in split mode
    pub fn secondary(&self) -> Option<&CameraPose> {
        self.secondary.as_ref()
    }

    /// Whether the second view is active
    pub fn is_split(&self) -> bool {
        self.split_offset.is_some()
    }

    /// Enable split view with the second camera `offset` to the right
    pub fn enable_split(&mut self, offset: f32) {
        self.split_offset = Some(offset);
        self.update_split();
    }

    /// Back to a single view
    pub fn disable_split(&mut self) {
        self.split_offset = None;
        self.secondary = None;
    }

    /// Recompute the second pose from the primary's current pose
    pub fn update_split(&mut self) {
        self.secondary = self.split_offset.map(|offset| CameraPose {
            position: self.primary.position + self.primary.right() * offset,
            orientation: self.primary.orientation,
        });
    }
}
