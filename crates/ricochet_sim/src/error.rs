//! Error types for the simulation core

use crate::character::CharacterId;
use crate::scene::BoneId;
use glam::Vec3;
use ricochet_physics::PhysicsError;
use thiserror::Error;

/// Simulation errors
#[derive(Debug, Error)]
pub enum SimError {
    /// Error from the physics world
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// Shooting direction with no usable length
    #[error("Invalid projectile direction: {0:?}")]
    InvalidDirection(Vec3),

    /// Operation needs physics, which failed to initialize
    #[error("Physics is disabled")]
    PhysicsDisabled,

    /// Character not in the registry
    #[error("Unknown character: {0:?}")]
    UnknownCharacter(CharacterId),

    /// Parent bone does not exist
    #[error("Unknown bone: {0:?}")]
    UnknownBone(BoneId),

    /// Invalid configuration
    #[error("Invalid simulation configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;
