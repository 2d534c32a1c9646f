//! Rigid body types

use crate::convert;
use glam::{Quat, Vec3};
use rapier3d::prelude as rapier;

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub(crate) rapier::RigidBodyHandle);

/// Semantic role of a body in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRole {
    /// Static level geometry - never moves
    FixedEnvironment,
    /// Position-driven stand-in for a skeletal bone
    KinematicBoneProxy,
    /// Fully simulated projectile
    DynamicProjectile,
}

impl From<BodyRole> for rapier::RigidBodyType {
    fn from(role: BodyRole) -> Self {
        match role {
            BodyRole::FixedEnvironment => rapier::RigidBodyType::Fixed,
            BodyRole::KinematicBoneProxy => rapier::RigidBodyType::KinematicPositionBased,
            BodyRole::DynamicProjectile => rapier::RigidBodyType::Dynamic,
        }
    }
}

/// Position, orientation and linear velocity of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
}

/// Description for creating a rigid body
#[derive(Debug, Clone)]
pub struct RigidBodyDesc {
    /// Role (and therefore Rapier body type)
    pub role: BodyRole,
    /// Initial position
    pub position: Vec3,
    /// Initial orientation
    pub orientation: Quat,
    /// Initial linear velocity
    pub linear_velocity: Vec3,
    /// Enable continuous collision detection
    pub ccd_enabled: bool,
    /// Can this body sleep when inactive
    pub can_sleep: bool,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            role: BodyRole::DynamicProjectile,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            ccd_enabled: false,
            can_sleep: true,
        }
    }
}

impl RigidBodyDesc {
    /// Static environment body
    pub fn environment() -> Self {
        Self {
            role: BodyRole::FixedEnvironment,
            ..Default::default()
        }
    }

    /// Kinematic bone proxy body
    pub fn bone_proxy() -> Self {
        Self {
            role: BodyRole::KinematicBoneProxy,
            can_sleep: false,
            ..Default::default()
        }
    }

    /// Dynamic projectile body
    pub fn projectile() -> Self {
        Self {
            role: BodyRole::DynamicProjectile,
            ..Default::default()
        }
    }

    /// Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set orientation
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set linear velocity
    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Enable CCD
    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd_enabled = enabled;
        self
    }

    /// Build a Rapier rigid body builder
    pub(crate) fn to_rapier_builder(&self) -> rapier::RigidBodyBuilder {
        rapier::RigidBodyBuilder::new(self.role.into())
            .position(convert::to_isometry(self.position, self.orientation))
            .linvel(convert::to_vector(self.linear_velocity))
            .ccd_enabled(self.ccd_enabled)
            .can_sleep(self.can_sleep)
    }
}
