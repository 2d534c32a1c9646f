//! Ricochet Physics - Rapier 3D Integration
//!
//! Physics world adapter used by the simulation core. It owns gravity and the
//! step cadence, and creates the three kinds of bodies the demo needs.
//!
//! # Features
//!
//! - Fixed environment bodies with triangle-mesh colliders
//! - Kinematic bone proxies driven by next-position targets
//! - Dynamic projectiles with sphere colliders and CCD
//! - Fixed-timestep accumulator (or variable stepping)
//! - Collision start/stop events
//! - Timed initialization for degraded startup
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 PhysicsWorld                     │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────┐ │
//! │  │ RigidBodySet│  │ ColliderSet │  │  Roles  │ │
//! │  └─────────────┘  └─────────────┘  └─────────┘ │
//! │  ┌─────────────────────────────────────────────┐│
//! │  │   PhysicsPipeline + step accumulator        ││
//! │  └─────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────┘
//!                        │
//!         ┌──────────────┼──────────────┐
//!         ▼              ▼              ▼
//!   FixedEnvironment KinematicBone DynamicProjectile
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ricochet_physics::prelude::*;
//! use glam::Vec3;
//!
//! let mut physics = PhysicsWorld::new(PhysicsConfig::default())?;
//!
//! let ball = physics.create_body(
//!     RigidBodyDesc::projectile()
//!         .with_position(Vec3::new(0.0, 2.0, 0.0))
//!         .with_linear_velocity(Vec3::new(0.0, 0.0, -15.0)),
//! );
//! physics.create_collider(ColliderDesc::new(ColliderShape::sphere(0.1)), Some(ball))?;
//!
//! physics.step(1.0 / 60.0);
//! ```

pub mod body;
pub mod collider;
pub mod config;
mod convert;
pub mod error;
pub mod events;
pub mod material;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{BodyRole, BodyState, RigidBodyDesc, RigidBodyHandle};
    pub use crate::collider::{ColliderDesc, ColliderHandle, ColliderShape};
    pub use crate::config::{PhysicsConfig, StepMode};
    pub use crate::error::{PhysicsError, Result};
    pub use crate::events::{CollisionEvent, CollisionEventType};
    pub use crate::material::{CombineRule, PhysicsMaterial};
    pub use crate::world::PhysicsWorld;
}

pub use prelude::*;
