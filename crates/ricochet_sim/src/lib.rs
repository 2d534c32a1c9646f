//! Ricochet Sim - Real-Time Simulation Core
//!
//! The per-frame loop of the demo: physics stepping, projectile tracking,
//! bounce detection, bone proxies that let projectiles hit animated
//! characters, and the sounds those events trigger.
//!
//! # Features
//!
//! - Kinematic bone proxies synced to animated skeletons every frame
//! - Projectiles with visual/physics sync, ageing and a live cap
//! - Bounce detection from velocity discontinuities
//! - Distance and speed shaped impact sounds, cooldown-gated voice lines
//! - Pointer-locked, radius-bounded camera movement
//! - Single or split view render plans with a debug collision view
//! - Degraded mode when physics fails to initialize
//!
//! # Example
//!
//! ```ignore
//! use ricochet_sim::prelude::*;
//! use ricochet_physics::{PhysicsConfig, PhysicsWorld};
//!
//! let physics = PhysicsWorld::new(PhysicsConfig::default()).ok();
//! let mut sim = Simulation::new(SimConfig::default(), physics, CameraPose::default())?;
//! sim.add_environment(&floor_vertices, &floor_indices)?;
//!
//! let mut clock = FrameClock::new(sim.config().max_frame_delta);
//! loop {
//!     let report = sim.tick(clock.tick(), &input, &mut audio, &mut renderer);
//! }
//! ```

pub mod camera;
pub mod character;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod movement;
pub mod presentation;
pub mod projectile;
pub mod rig;
pub mod scene;
pub mod skeleton;

pub mod prelude {
    //! Common imports for the simulation core
    pub use crate::camera::{CameraPose, CameraRig, PITCH_LIMIT};
    pub use crate::character::{Character, CharacterId, CharacterRegistry, VoiceCooldown};
    pub use crate::config::{
        BounceAudioConfig, MovementConfig, ProjectileConfig, RigConfig, SimConfig, VoiceConfig,
    };
    pub use crate::dispatch::AudioDispatcher;
    pub use crate::error::{Result, SimError};
    pub use crate::frame::{FrameClock, FrameInput, FrameReport, LockRequest, Simulation};
    pub use crate::movement::{KeyState, MoveKey, MoveOutcome, MovementController, PointerLock};
    pub use crate::presentation::{
        DebugSphere, EnvironmentLayer, FramePlan, HeadlessRenderer, Renderer, ViewPass, Viewport,
    };
    pub use crate::projectile::{
        detect_bounce, BounceEvent, Projectile, ProjectileId, ProjectileTracker, VisualTransform,
    };
    pub use crate::rig::BoneProxy;
    pub use crate::scene::{Animated, BoneId, BoneSource, CharacterModel};
    pub use crate::skeleton::{
        AnimatedSkeleton, AnimationClip, AnimationPlayer, BonePose, Skeleton, TrackQuat, TrackVec3,
    };
}

pub use prelude::*;
