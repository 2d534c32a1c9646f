//! Physics world - main simulation container

use crate::body::{BodyRole, BodyState, RigidBodyDesc, RigidBodyHandle};
use crate::collider::{ColliderDesc, ColliderHandle};
use crate::config::{PhysicsConfig, StepMode};
use crate::convert;
use crate::error::{PhysicsError, Result};
use crate::events::{ChannelEventCollector, CollisionEvent, EventCollector};
use crossbeam_channel::RecvTimeoutError;
use glam::{Quat, Vec3};
use rapier3d::prelude as rapier;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

/// The main physics world containing all simulation state
pub struct PhysicsWorld {
    /// Configuration
    config: PhysicsConfig,

    /// Rapier physics pipeline
    pipeline: rapier::PhysicsPipeline,

    /// Gravity
    gravity: rapier::Vector<f32>,

    /// Integration parameters
    integration_params: rapier::IntegrationParameters,

    /// Island manager
    islands: rapier::IslandManager,

    /// Broad phase
    broad_phase: rapier::DefaultBroadPhase,

    /// Narrow phase
    narrow_phase: rapier::NarrowPhase,

    /// Impulse joint set
    impulse_joints: rapier::ImpulseJointSet,

    /// Multibody joint set
    multibody_joints: rapier::MultibodyJointSet,

    /// CCD solver
    ccd_solver: rapier::CCDSolver,

    /// Rigid body set
    bodies: rapier::RigidBodySet,

    /// Collider set
    colliders: rapier::ColliderSet,

    /// Semantic role of every live body
    roles: HashMap<RigidBodyHandle, BodyRole>,

    /// Events of the last `step` call
    events: EventCollector,

    /// Accumulated time for fixed timestep
    accumulated_time: f32,

    /// Number of simulation ticks run so far
    ticks: u64,
}

impl PhysicsWorld {
    /// Create a new physics world
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;

        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.num_solver_iterations = NonZeroUsize::new(config.velocity_iterations)
            .ok_or_else(|| PhysicsError::InvalidConfig("velocity_iterations must be at least 1".into()))?;

        log::debug!(
            "Physics world created: gravity={:?}, timestep={}, mode={:?}",
            config.gravity,
            config.timestep,
            config.step_mode
        );

        Ok(Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            roles: HashMap::new(),
            events: EventCollector::new(),
            accumulated_time: 0.0,
            ticks: 0,
        })
    }

    /// Create the world on a worker thread, giving up after `timeout`.
    ///
    /// A timeout leaves the worker to finish on its own; its result is dropped.
    pub fn init_with_timeout(config: PhysicsConfig, timeout: Duration) -> Result<Self> {
        Self::init_on_worker(move || PhysicsWorld::new(config), timeout)
    }

    /// Run `build` on the `physics-init` thread and wait up to `timeout`
    pub(crate) fn init_on_worker<F>(build: F, timeout: Duration) -> Result<Self>
    where
        F: FnOnce() -> Result<Self> + Send + 'static,
    {
        let (sender, receiver) = crossbeam_channel::bounded(1);

        std::thread::Builder::new()
            .name("physics-init".into())
            .spawn(move || {
                let _ = sender.send(build());
            })
            .map_err(|e| PhysicsError::InitFailed(e.to_string()))?;

        match receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(PhysicsError::InitTimeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(PhysicsError::InitFailed(
                "initialization worker exited without a result".into(),
            )),
        }
    }

    /// Get the physics configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Set gravity
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = convert::to_vector(gravity);
    }

    /// Get gravity
    pub fn gravity(&self) -> Vec3 {
        convert::from_vector(&self.gravity)
    }

    // ==================== Rigid Bodies ====================

    /// Create a rigid body. CCD and sleeping stay off when the world
    /// config disables them, whatever the descriptor asks for.
    pub fn create_body(&mut self, mut desc: RigidBodyDesc) -> RigidBodyHandle {
        desc.ccd_enabled &= self.config.ccd_enabled;
        desc.can_sleep &= self.config.sleeping_enabled;
        let handle = RigidBodyHandle(self.bodies.insert(desc.to_rapier_builder()));
        self.roles.insert(handle, desc.role);
        handle
    }

    /// Remove a rigid body and its attached colliders
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> Result<()> {
        self.bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        self.roles.remove(&handle);
        Ok(())
    }

    /// Whether the handle refers to a live body
    pub fn contains_body(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    /// Role a body was created with
    pub fn body_role(&self, handle: RigidBodyHandle) -> Option<BodyRole> {
        self.roles.get(&handle).copied()
    }

    fn body(&self, handle: RigidBodyHandle) -> Result<&rapier::RigidBody> {
        self.bodies.get(handle.0).ok_or(PhysicsError::BodyNotFound(handle))
    }

    fn body_mut(&mut self, handle: RigidBodyHandle) -> Result<&mut rapier::RigidBody> {
        self.bodies.get_mut(handle.0).ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Position, orientation and linear velocity in one read
    pub fn body_state(&self, handle: RigidBodyHandle) -> Result<BodyState> {
        let body = self.body(handle)?;
        Ok(BodyState {
            position: convert::from_vector(body.translation()),
            orientation: convert::from_rotation(body.rotation()),
            linear_velocity: convert::from_vector(body.linvel()),
        })
    }

    /// Get rigid body position
    pub fn body_position(&self, handle: RigidBodyHandle) -> Result<Vec3> {
        self.body(handle).map(|b| convert::from_vector(b.translation()))
    }

    /// Get rigid body orientation
    pub fn body_orientation(&self, handle: RigidBodyHandle) -> Result<Quat> {
        self.body(handle).map(|b| convert::from_rotation(b.rotation()))
    }

    /// Get rigid body linear velocity
    pub fn body_linear_velocity(&self, handle: RigidBodyHandle) -> Result<Vec3> {
        self.body(handle).map(|b| convert::from_vector(b.linvel()))
    }

    /// Set rigid body linear velocity
    pub fn set_body_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) -> Result<()> {
        self.body_mut(handle)?
            .set_linvel(convert::to_vector(velocity), true);
        Ok(())
    }

    /// Set the position a kinematic body will reach at the next step.
    ///
    /// Rapier derives the body's velocity from the move, so contacts see a
    /// moving body instead of a teleport.
    pub fn set_kinematic_target(&mut self, handle: RigidBodyHandle, position: Vec3) -> Result<()> {
        let body = self.body_mut(handle)?;
        if !body.is_kinematic() {
            return Err(PhysicsError::NotKinematic(handle));
        }
        body.set_next_kinematic_translation(convert::to_vector(position));
        Ok(())
    }

    /// Position a kinematic body is heading to
    pub fn kinematic_target(&self, handle: RigidBodyHandle) -> Result<Vec3> {
        let body = self.body(handle)?;
        if !body.is_kinematic() {
            return Err(PhysicsError::NotKinematic(handle));
        }
        Ok(convert::from_vector(&body.next_position().translation.vector))
    }

    // ==================== Colliders ====================

    /// Create a collider, optionally attached to a rigid body
    pub fn create_collider(
        &mut self,
        desc: ColliderDesc,
        parent: Option<RigidBodyHandle>,
    ) -> Result<ColliderHandle> {
        let builder = desc.to_rapier_builder();
        let handle = match parent {
            Some(body) => {
                if !self.bodies.contains(body.0) {
                    return Err(PhysicsError::BodyNotFound(body));
                }
                self.colliders.insert_with_parent(builder, body.0, &mut self.bodies)
            }
            None => self.colliders.insert(builder),
        };
        Ok(ColliderHandle(handle))
    }

    /// Remove a collider
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> Result<()> {
        self.colliders
            .remove(handle.0, &mut self.islands, &mut self.bodies, true)
            .map(|_| ())
            .ok_or(PhysicsError::ColliderNotFound(handle))
    }

    // ==================== Simulation ====================

    /// Advance the simulation by a frame's elapsed time.
    ///
    /// Returns the number of ticks actually run.
    pub fn step(&mut self, delta_time: f32) -> u32 {
        self.events.clear();

        match self.config.step_mode {
            StepMode::Fixed => {
                let timestep = self.config.timestep;
                self.accumulated_time += delta_time.max(0.0);

                let mut steps = 0;
                while self.accumulated_time >= timestep && steps < self.config.max_substeps {
                    self.step_internal(timestep);
                    self.accumulated_time -= timestep;
                    steps += 1;
                }

                // Drop the backlog instead of spiralling on slow frames
                if self.accumulated_time >= timestep {
                    log::trace!(
                        "Physics fell behind, dropping {:.4}s of simulation time",
                        self.accumulated_time
                    );
                    self.accumulated_time %= timestep;
                }

                steps
            }
            StepMode::Variable => {
                let dt = delta_time.min(self.config.max_variable_step);
                if dt <= 0.0 {
                    return 0;
                }
                self.step_internal(dt);
                1
            }
        }
    }

    /// Fraction of a fixed tick waiting in the accumulator
    pub fn accumulated_time(&self) -> f32 {
        self.accumulated_time
    }

    /// Internal single tick
    fn step_internal(&mut self, dt: f32) {
        self.integration_params.dt = dt;

        let (collision_send, collision_recv) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector {
            collision_events: collision_send,
        };

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );

        self.events.drain_from(&collision_recv, &self.colliders);
        self.ticks += 1;
    }

    // ==================== Events ====================

    /// Collision events from the last `step` call
    pub fn collision_events(&self) -> &[CollisionEvent] {
        &self.events.collision_events
    }

    /// Collision start events from the last `step` call
    pub fn collision_started(&self) -> impl Iterator<Item = &CollisionEvent> {
        self.events.collision_events.iter().filter(|e| e.is_started())
    }

    // ==================== Debug ====================

    /// Get number of rigid bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Get number of colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Get number of active (awake) dynamic bodies
    pub fn active_body_count(&self) -> usize {
        self.islands.active_dynamic_bodies().len()
    }

    /// Total simulation ticks run
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// One-line summary for periodic logging
    pub fn debug_info(&self) -> String {
        format!(
            "{} bodies ({} awake), {} colliders, {} ticks",
            self.body_count(),
            self.active_body_count(),
            self.collider_count(),
            self.ticks
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::ColliderShape;
    use crate::material::{CombineRule, PhysicsMaterial};
    use approx::assert_relative_eq;

    fn floor(world: &mut PhysicsWorld, restitution: f32) -> ColliderHandle {
        let vertices = [
            -10.0, 0.0, -10.0, //
            10.0, 0.0, -10.0, //
            10.0, 0.0, 10.0, //
            -10.0, 0.0, 10.0,
        ];
        let shape = ColliderShape::trimesh_from_buffers(&vertices, &[0, 2, 1, 0, 3, 2]).unwrap();
        let body = world.create_body(RigidBodyDesc::environment());
        world
            .create_collider(
                ColliderDesc::new(shape).with_material(PhysicsMaterial::default().with_restitution(restitution)),
                Some(body),
            )
            .unwrap()
    }

    fn ball(world: &mut PhysicsWorld, position: Vec3, velocity: Vec3) -> RigidBodyHandle {
        let body = world.create_body(
            RigidBodyDesc::projectile()
                .with_position(position)
                .with_linear_velocity(velocity)
                .with_ccd(true),
        );
        world
            .create_collider(
                ColliderDesc::new(ColliderShape::sphere(0.1))
                    .with_material(
                        PhysicsMaterial::default()
                            .with_restitution(0.8)
                            .with_restitution_combine(CombineRule::Max),
                    )
                    .with_collision_events(),
                Some(body),
            )
            .unwrap();
        body
    }

    #[test]
    fn test_create_world() {
        let world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = PhysicsWorld::new(PhysicsConfig::default().with_timestep(-1.0));
        assert!(matches!(result, Err(PhysicsError::InvalidConfig(_))));
    }

    #[test]
    fn test_init_with_timeout_succeeds() {
        let world = PhysicsWorld::init_with_timeout(PhysicsConfig::default(), Duration::from_secs(10)).unwrap();
        assert_eq!(world.tick_count(), 0);
    }

    #[test]
    fn test_init_with_timeout_reports_config_errors() {
        let result = PhysicsWorld::init_with_timeout(
            PhysicsConfig::default().with_max_substeps(0),
            Duration::from_secs(10),
        );
        assert!(matches!(result, Err(PhysicsError::InvalidConfig(_))));
    }

    #[test]
    fn test_init_times_out_on_slow_worker() {
        let timeout = Duration::from_millis(20);
        let result = PhysicsWorld::init_on_worker(
            || {
                std::thread::sleep(Duration::from_millis(500));
                PhysicsWorld::new(PhysicsConfig::default())
            },
            timeout,
        );
        assert!(matches!(result, Err(PhysicsError::InitTimeout(t)) if t == timeout));
    }

    #[test]
    fn test_init_reports_worker_panic() {
        let result = PhysicsWorld::init_on_worker(|| panic!("no world today"), Duration::from_secs(10));
        assert!(matches!(result, Err(PhysicsError::InitFailed(_))));
    }

    #[test]
    fn test_ccd_follows_world_config() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let shot = world.create_body(RigidBodyDesc::projectile().with_ccd(true));
        assert!(world.bodies[shot.0].is_ccd_enabled());

        let mut world = PhysicsWorld::new(PhysicsConfig {
            ccd_enabled: false,
            ..Default::default()
        })
        .unwrap();
        let shot = world.create_body(RigidBodyDesc::projectile().with_ccd(true));
        assert!(!world.bodies[shot.0].is_ccd_enabled());
    }

    #[test]
    fn test_resting_body_sleeps_only_when_enabled() {
        let settle = |sleeping_enabled: bool| {
            let mut world = PhysicsWorld::new(PhysicsConfig {
                sleeping_enabled,
                ..PhysicsConfig::default().with_gravity(0.0, 0.0, 0.0)
            })
            .unwrap();
            let body = ball(&mut world, Vec3::ZERO, Vec3::ZERO);
            for _ in 0..600 {
                world.step(1.0 / 60.0);
            }
            world.bodies[body.0].is_sleeping()
        };

        assert!(settle(true));
        assert!(!settle(false));
    }

    #[test]
    fn test_roles_are_recorded() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let env = world.create_body(RigidBodyDesc::environment());
        let bone = world.create_body(RigidBodyDesc::bone_proxy());
        let shot = world.create_body(RigidBodyDesc::projectile());

        assert_eq!(world.body_role(env), Some(BodyRole::FixedEnvironment));
        assert_eq!(world.body_role(bone), Some(BodyRole::KinematicBoneProxy));
        assert_eq!(world.body_role(shot), Some(BodyRole::DynamicProjectile));
    }

    #[test]
    fn test_gravity_fall() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let body = ball(&mut world, Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);

        let initial_y = world.body_position(body).unwrap().y;
        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }
        let final_y = world.body_position(body).unwrap().y;

        assert!(final_y < initial_y, "Body should fall due to gravity");
    }

    #[test]
    fn test_initial_velocity_is_kept_before_step() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let body = ball(&mut world, Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0));
        assert_relative_eq!(world.body_linear_velocity(body).unwrap().length(), 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_kinematic_target_round_trip() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let bone = world.create_body(RigidBodyDesc::bone_proxy().with_position(Vec3::new(1.0, 1.0, 1.0)));

        let target = Vec3::new(1.5, 2.0, -0.5);
        world.set_kinematic_target(bone, target).unwrap();
        assert_relative_eq!(world.kinematic_target(bone).unwrap().x, target.x, epsilon = 1e-6);
        assert_relative_eq!(world.kinematic_target(bone).unwrap().y, target.y, epsilon = 1e-6);
        assert_relative_eq!(world.kinematic_target(bone).unwrap().z, target.z, epsilon = 1e-6);

        world.step(1.0 / 60.0);
        let reached = world.body_position(bone).unwrap();
        assert!((reached - target).length() < 1e-5);
    }

    #[test]
    fn test_kinematic_target_requires_kinematic_body() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let body = world.create_body(RigidBodyDesc::projectile());
        let result = world.set_kinematic_target(body, Vec3::ONE);
        assert!(matches!(result, Err(PhysicsError::NotKinematic(_))));
    }

    #[test]
    fn test_ball_bounces_off_trimesh_floor() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        floor(&mut world, 0.8);
        let body = ball(&mut world, Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO);

        let mut fell = false;
        let mut rebounded = false;
        for _ in 0..120 {
            world.step(1.0 / 60.0);
            let vy = world.body_linear_velocity(body).unwrap().y;
            if vy < -1.0 {
                fell = true;
            }
            if fell && vy > 1.0 {
                rebounded = true;
                break;
            }
        }

        assert!(rebounded, "Ball should bounce off the floor");
    }

    #[test]
    fn test_collision_events_reported() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let floor_collider = floor(&mut world, 0.5);
        ball(&mut world, Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, -5.0, 0.0));

        let mut seen = false;
        for _ in 0..60 {
            world.step(1.0 / 60.0);
            if world.collision_started().any(|e| e.involves(floor_collider)) {
                seen = true;
                break;
            }
        }
        assert!(seen, "Expected a collision start event with the floor");
    }

    #[test]
    fn test_fixed_step_accumulates() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let timestep = world.config().timestep;

        assert_eq!(world.step(timestep * 0.5), 0);
        assert_eq!(world.step(timestep * 0.6), 1);
        assert_eq!(world.tick_count(), 1);
        assert!(world.accumulated_time() < timestep);
    }

    #[test]
    fn test_fixed_step_caps_substeps() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default().with_max_substeps(2)).unwrap();
        let timestep = world.config().timestep;

        assert_eq!(world.step(timestep * 10.5), 2);
        assert!(world.accumulated_time() < timestep);
    }

    #[test]
    fn test_variable_step_runs_once() {
        let mut world = PhysicsWorld::new(PhysicsConfig::variable()).unwrap();
        assert_eq!(world.step(0.005), 1);
        assert_eq!(world.step(0.0), 0);
        assert_eq!(world.tick_count(), 1);
    }

    #[test]
    fn test_remove_body() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let body = ball(&mut world, Vec3::ZERO, Vec3::ZERO);
        assert_eq!(world.collider_count(), 1);

        world.remove_body(body).unwrap();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert!(world.body_role(body).is_none());
        assert!(matches!(world.remove_body(body), Err(PhysicsError::BodyNotFound(_))));
    }

    #[test]
    fn test_collider_requires_live_parent() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let body = world.create_body(RigidBodyDesc::projectile());
        world.remove_body(body).unwrap();
        let result = world.create_collider(ColliderDesc::new(ColliderShape::sphere(0.1)), Some(body));
        assert!(matches!(result, Err(PhysicsError::BodyNotFound(_))));
    }

    #[test]
    fn test_velocity_write_without_gravity() {
        let mut world = PhysicsWorld::new(PhysicsConfig::variable()).unwrap();
        world.set_gravity(Vec3::ZERO);
        assert_eq!(world.gravity(), Vec3::ZERO);

        let tilt = Quat::from_rotation_y(0.5);
        let body = world.create_body(RigidBodyDesc::projectile().with_orientation(tilt));
        assert!(world.contains_body(body));
        assert_relative_eq!(world.body_orientation(body).unwrap().dot(tilt).abs(), 1.0, epsilon = 1e-6);

        world.set_body_linear_velocity(body, Vec3::new(2.0, 0.0, 0.0)).unwrap();
        assert_eq!(world.step(0.01), 1);
        assert_relative_eq!(world.body_position(body).unwrap().x, 0.02, epsilon = 1e-4);
        assert_relative_eq!(world.body_linear_velocity(body).unwrap().y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_remove_collider_keeps_body() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let body = world.create_body(RigidBodyDesc::projectile());
        let collider = world
            .create_collider(ColliderDesc::new(ColliderShape::sphere(0.1)), Some(body))
            .unwrap();

        world.remove_collider(collider).unwrap();
        assert_eq!(world.collider_count(), 0);
        assert!(world.contains_body(body));
        assert!(matches!(
            world.remove_collider(collider),
            Err(PhysicsError::ColliderNotFound(_))
        ));
    }
}
