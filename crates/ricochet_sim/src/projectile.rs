//! Projectile tracker
//!
//! Owns every live projectile, mirrors its physics pose onto the visual
//! transform after each step, and flags bounces.
//!
//! Bounces are detected from the change in linear velocity between two
//! observations. This is a heuristic: several contacts within one frame may
//! produce a spurious event, and glancing hits below the threshold are
//! missed.

use crate::config::ProjectileConfig;
use crate::error::{Result, SimError};
use glam::{Quat, Vec3};
use ricochet_physics::{
    ColliderDesc, ColliderShape, PhysicsMaterial, PhysicsWorld, RigidBodyDesc, RigidBodyHandle,
};
use std::collections::VecDeque;

/// Identifier of a projectile, unique for the tracker's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(pub u64);

/// Pose of a projectile's visual sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualTransform {
    /// World position
    pub position: Vec3,
    /// World rotation
    pub orientation: Quat,
    /// Sphere radius
    pub radius: f32,
}

/// A live projectile
#[derive(Debug, Clone)]
pub struct Projectile {
    /// Tracker-assigned id
    pub id: ProjectileId,
    /// Physics body
    pub body: RigidBodyHandle,
    /// Visual pose as of the last sync
    pub transform: VisualTransform,
    /// Velocity seen on the previous frame
    pub last_velocity: Vec3,
    /// Seconds since spawn
    pub age: f32,
}

/// A sharp velocity change of one projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceEvent {
    /// Projectile that bounced
    pub projectile: ProjectileId,
    /// Where the bounce happened
    pub position: Vec3,
    /// Velocity after the bounce
    pub velocity: Vec3,
}

/// Whether a velocity change is large enough to count as a bounce
pub fn detect_bounce(last_velocity: Vec3, velocity: Vec3, threshold: f32) -> bool {
    (velocity - last_velocity).length() > threshold
}

/// Live projectiles, oldest first
#[derive(Debug)]
pub struct ProjectileTracker {
    config: ProjectileConfig,
    projectiles: VecDeque<Projectile>,
    next_id: u64,
}

impl ProjectileTracker {
    /// Empty tracker
    pub fn new(config: ProjectileConfig) -> Self {
        Self {
            config,
            projectiles: VecDeque::new(),
            next_id: 0,
        }
    }

    /// Spawn and retirement settings
    pub fn config(&self) -> &ProjectileConfig {
        &self.config
    }

    /// Launch a projectile from `origin` along `direction`.
    ///
    /// At the live cap the oldest projectile is removed first.
    pub fn spawn(
        &mut self,
        world: &mut PhysicsWorld,
        origin: Vec3,
        direction: Vec3,
        speed: f32,
    ) -> Result<ProjectileId> {
        let direction = direction
            .try_normalize()
            .ok_or(SimError::InvalidDirection(direction))?;

        while self.projectiles.len() >= self.config.max_live {
            if let Some(oldest) = self.projectiles.pop_front() {
                log::debug!("Projectile cap reached, evicting {:?}", oldest.id);
                Self::remove_body(world, &oldest);
            }
        }

        let velocity = direction * speed;
        let body = world.create_body(
            RigidBodyDesc::projectile()
                .with_position(origin)
                .with_linear_velocity(velocity)
                .with_ccd(true),
        );
        let material = PhysicsMaterial::default().with_restitution(self.config.restitution);
        if let Err(e) = world.create_collider(
            ColliderDesc::new(ColliderShape::sphere(self.config.radius))
                .with_material(material)
                .with_collision_events(),
            Some(body),
        ) {
            let _ = world.remove_body(body);
            return Err(e.into());
        }

        let id = ProjectileId(self.next_id);
        self.next_id += 1;
        self.projectiles.push_back(Projectile {
            id,
            body,
            transform: VisualTransform {
                position: origin,
                orientation: Quat::IDENTITY,
                radius: self.config.radius,
            },
            last_velocity: velocity,
            age: 0.0,
        });

        log::debug!("Spawned {:?} at {:?} with velocity {:?}", id, origin, velocity);
        Ok(id)
    }

    /// Copy physics poses onto visuals and report bounces
    pub fn sync_and_detect(&mut self, world: &PhysicsWorld, threshold: f32) -> Vec<BounceEvent> {
        let mut events = Vec::new();
        for projectile in &mut self.projectiles {
            let state = match world.body_state(projectile.body) {
                Ok(state) => state,
                Err(e) => {
                    log::debug!("Skipping {:?}: {}", projectile.id, e);
                    continue;
                }
            };

            projectile.transform.position = state.position;
            projectile.transform.orientation = state.orientation;

            if detect_bounce(projectile.last_velocity, state.linear_velocity, threshold) {
                events.push(BounceEvent {
                    projectile: projectile.id,
                    position: state.position,
                    velocity: state.linear_velocity,
                });
            }
            projectile.last_velocity = state.linear_velocity;
        }

        if !events.is_empty() {
            log::trace!("{} bounce(s) this frame", events.len());
        }
        events
    }

    /// Age projectiles and remove those past `max_age` or below `kill_height`.
    ///
    /// Returns how many were removed.
    pub fn retire_expired(&mut self, world: &mut PhysicsWorld, dt: f32) -> usize {
        let max_age = self.config.max_age;
        let kill_height = self.config.kill_height;
        let before = self.projectiles.len();

        self.projectiles.retain_mut(|projectile| {
            projectile.age += dt.max(0.0);
            let expired = projectile.age > max_age || projectile.transform.position.y < kill_height;
            if expired {
                Self::remove_body(world, projectile);
            }
            !expired
        });

        before - self.projectiles.len()
    }

    /// Remove a single projectile
    pub fn despawn(&mut self, world: &mut PhysicsWorld, id: ProjectileId) -> bool {
        match self.projectiles.iter().position(|p| p.id == id) {
            Some(index) => {
                if let Some(projectile) = self.projectiles.remove(index) {
                    Self::remove_body(world, &projectile);
                }
                true
            }
            None => false,
        }
    }

    /// Remove every projectile
    pub fn clear(&mut self, world: &mut PhysicsWorld) {
        for projectile in self.projectiles.drain(..) {
            Self::remove_body(world, &projectile);
        }
    }

    fn remove_body(world: &mut PhysicsWorld, projectile: &Projectile) {
        if let Err(e) = world.remove_body(projectile.body) {
            log::debug!("{:?} body already gone: {}", projectile.id, e);
        }
    }

    /// Look up a live projectile
    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    /// Live projectiles in spawn order
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    /// Number of live projectiles
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// Whether nothing is in flight
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }
}
