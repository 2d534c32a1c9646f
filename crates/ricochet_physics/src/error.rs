//! Error types for the physics system

use std::time::Duration;
use thiserror::Error;

/// Physics system errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Rigid body not found
    #[error("Rigid body not found: {0:?}")]
    BodyNotFound(crate::body::RigidBodyHandle),

    /// Collider not found
    #[error("Collider not found: {0:?}")]
    ColliderNotFound(crate::collider::ColliderHandle),

    /// Kinematic operation on a body that is not kinematic
    #[error("Rigid body is not kinematic: {0:?}")]
    NotKinematic(crate::body::RigidBodyHandle),

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),

    /// Shape creation failed
    #[error("Failed to create collision shape: {0}")]
    ShapeCreationFailed(String),

    /// The world did not become ready in time
    #[error("Physics initialization timed out after {0:?}")]
    InitTimeout(Duration),

    /// The initialization worker could not run
    #[error("Physics initialization failed: {0}")]
    InitFailed(String),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
