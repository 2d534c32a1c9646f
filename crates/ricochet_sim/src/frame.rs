//! Frame orchestrator
//!
//! `Simulation` owns all per-frame state and runs the fixed sequence:
//!
//! ```text
//! input -> movement -> cooldowns -> physics step -> sync/detect
//!       -> bounce audio + voice -> retire projectiles -> animation
//!       -> bone proxy sync -> split camera -> render plan
//! ```
//!
//! Everything runs on the caller's thread. Physics may be absent (failed
//! initialization); the loop keeps running without it.

use crate::camera::{CameraPose, CameraRig};
use crate::character::{Character, CharacterId, CharacterRegistry};
use crate::config::SimConfig;
use crate::dispatch::AudioDispatcher;
use crate::error::{Result, SimError};
use crate::movement::{KeyState, MoveOutcome, MovementController};
use crate::presentation::{compose_frame, FramePlan, Renderer};
use crate::projectile::{BounceEvent, ProjectileId, ProjectileTracker};
use crate::rig;
use crate::scene::CharacterModel;
use glam::Vec2;
use ricochet_audio::{AudioOutput, ClipId};
use ricochet_physics::{
    ColliderDesc, ColliderShape, PhysicsMaterial, PhysicsWorld, RigidBodyDesc, RigidBodyHandle,
};
use std::time::Instant;

/// Pointer capture request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockRequest {
    Lock,
    Unlock,
    Toggle,
}

/// Input gathered since the previous frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Movement keys held this frame
    pub keys: KeyState,
    /// Pointer capture change, if any
    pub lock: Option<LockRequest>,
    /// Yaw/pitch change in radians, applied while locked
    pub look: Vec2,
    /// Fire one projectile from the camera
    pub shoot: bool,
    /// Flip debug drawing
    pub toggle_debug: bool,
}

/// What happened during one tick
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Seconds simulated
    pub dt: f32,
    /// Physics steps taken
    pub substeps: u32,
    /// What the camera did
    pub movement: MoveOutcome,
    /// Projectile fired this frame
    pub spawned: Option<ProjectileId>,
    /// Bounces detected this frame
    pub bounces: Vec<BounceEvent>,
    /// Characters that spoke
    pub voices: Vec<CharacterId>,
    /// Projectiles removed this frame
    pub retired: usize,
    /// Projectiles still in flight
    pub live_projectiles: usize,
}

/// Explicit simulation state driven once per frame
pub struct Simulation {
    config: SimConfig,
    physics: Option<PhysicsWorld>,
    camera: CameraRig,
    movement: MovementController,
    projectiles: ProjectileTracker,
    characters: CharacterRegistry,
    dispatcher: AudioDispatcher,
    environment: Vec<RigidBodyHandle>,
    debug_mode: bool,
    frame: u64,
}

impl Simulation {
    /// Build a simulation. `physics: None` runs in degraded mode.
    pub fn new(
        config: SimConfig,
        physics: Option<PhysicsWorld>,
        camera: CameraPose,
    ) -> Result<Self> {
        config.validate()?;

        if physics.is_none() {
            log::warn!("Simulation starting without physics, projectiles and bone proxies are off");
        }

        Ok(Self {
            movement: MovementController::new(config.movement.clone()),
            projectiles: ProjectileTracker::new(config.projectiles.clone()),
            dispatcher: AudioDispatcher::new(
                config.bounce_audio.clone(),
                config.voice.clone(),
                config.seed,
            ),
            camera: CameraRig::new(camera),
            characters: CharacterRegistry::new(),
            environment: Vec::new(),
            physics,
            config,
            debug_mode: false,
            frame: 0,
        })
    }

    // ==================== Accessors ====================

    /// Settings in use
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Physics world, absent when degraded
    pub fn physics(&self) -> Option<&PhysicsWorld> {
        self.physics.as_ref()
    }

    /// Running without physics
    pub fn is_degraded(&self) -> bool {
        self.physics.is_none()
    }

    /// Camera rig
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// Camera rig, for placement
    pub fn camera_mut(&mut self) -> &mut CameraRig {
        &mut self.camera
    }

    /// Movement and pointer lock
    pub fn movement(&self) -> &MovementController {
        &self.movement
    }

    /// Movement and pointer lock, mutably
    pub fn movement_mut(&mut self) -> &mut MovementController {
        &mut self.movement
    }

    /// Live projectiles
    pub fn projectiles(&self) -> &ProjectileTracker {
        &self.projectiles
    }

    /// Registered characters
    pub fn characters(&self) -> &CharacterRegistry {
        &self.characters
    }

    /// Sound dispatch state
    pub fn dispatcher(&self) -> &AudioDispatcher {
        &self.dispatcher
    }

    /// Environment bodies added so far
    pub fn environment(&self) -> &[RigidBodyHandle] {
        &self.environment
    }

    /// Frames ticked so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Whether bone colliders are drawn
    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Turn bone collider drawing on or off
    pub fn set_debug_mode(&mut self, enabled: bool) {
        self.debug_mode = enabled;
    }

    /// Clip played on bounces
    pub fn set_bounce_clip(&mut self, clip: Option<ClipId>) {
        self.dispatcher.set_bounce_clip(clip);
    }

    /// Show a second view offset to the right of the primary camera
    pub fn set_split_view(&mut self, enabled: bool) {
        if enabled {
            self.camera.enable_split(self.config.split_offset);
        } else {
            self.camera.disable_split();
        }
    }

    // ==================== Scene setup ====================

    /// Add static level geometry from flat vertex/index buffers
    pub fn add_environment(&mut self, vertices: &[f32], indices: &[u32]) -> Result<RigidBodyHandle> {
        let world = self.physics.as_mut().ok_or(SimError::PhysicsDisabled)?;
        let shape = ColliderShape::trimesh_from_buffers(vertices, indices)?;

        let body = world.create_body(RigidBodyDesc::environment());
        let material = PhysicsMaterial::default().with_restitution(self.config.environment_restitution);
        world.create_collider(ColliderDesc::new(shape).with_material(material), Some(body))?;

        log::info!("Added environment mesh ({} triangles)", indices.len() / 3);
        self.environment.push(body);
        Ok(body)
    }

    /// Register a character and bind its bones to physics.
    ///
    /// Without physics the character still animates but has no proxies.
    pub fn add_character(
        &mut self,
        name: impl Into<String>,
        model: Box<dyn CharacterModel>,
        voices: Vec<ClipId>,
    ) -> Result<CharacterId> {
        let proxies = match self.physics.as_mut() {
            Some(world) => rig::bind(world, model.as_ref(), self.config.rig.bone_radius)?,
            None => {
                log::warn!("Physics disabled, character has no bone proxies");
                Vec::new()
            }
        };

        let character = Character::new(name, model)
            .with_proxies(proxies)
            .with_voices(voices);
        Ok(self.characters.insert(character))
    }

    /// Remove a character and its bone proxies
    pub fn remove_character(&mut self, id: CharacterId) -> Result<()> {
        let character = self
            .characters
            .remove(id)
            .ok_or(SimError::UnknownCharacter(id))?;
        if let Some(world) = self.physics.as_mut() {
            rig::unbind(world, character.proxies())?;
        }
        Ok(())
    }

    /// Launch a projectile from the primary camera along its view direction
    pub fn shoot(&mut self) -> Result<ProjectileId> {
        let world = self.physics.as_mut().ok_or(SimError::PhysicsDisabled)?;
        let camera = self.camera.primary();
        let direction = camera.forward();
        let origin = camera.position + direction * self.config.projectiles.spawn_offset;
        self.projectiles
            .spawn(world, origin, direction, self.config.projectiles.speed)
    }

    // ==================== Frame ====================

    /// Run one frame.
    ///
    /// Errors inside the frame are logged and never stop it.
    pub fn tick(
        &mut self,
        dt: f32,
        input: &FrameInput,
        audio: &mut dyn AudioOutput,
        renderer: &mut dyn Renderer,
    ) -> FrameReport {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_frame_delta)
        } else {
            0.0
        };
        self.frame += 1;
        let mut report = FrameReport {
            frame: self.frame,
            dt,
            ..Default::default()
        };

        // Input
        match input.lock {
            Some(LockRequest::Lock) => self.movement.lock(),
            Some(LockRequest::Unlock) => self.movement.unlock(),
            Some(LockRequest::Toggle) => self.movement.toggle_lock(),
            None => {}
        }
        if input.toggle_debug {
            self.debug_mode = !self.debug_mode;
            log::info!("Debug view {}", if self.debug_mode { "on" } else { "off" });
        }
        if self.movement.is_locked() && input.look != Vec2::ZERO {
            self.camera.primary_mut().rotate(input.look.x, input.look.y);
        }
        if input.shoot {
            match self.shoot() {
                Ok(id) => report.spawned = Some(id),
                Err(SimError::PhysicsDisabled) => log::trace!("Shot ignored, physics disabled"),
                Err(e) => log::warn!("Failed to shoot: {}", e),
            }
        }

        report.movement = self
            .movement
            .update(&input.keys, self.camera.primary_mut(), dt);

        self.characters.tick_cooldowns(dt);

        if let Some(world) = self.physics.as_mut() {
            report.substeps = world.step(dt);

            report.bounces = self
                .projectiles
                .sync_and_detect(world, self.config.bounce_threshold);

            let listener = self.camera.primary().position;
            for event in &report.bounces {
                self.dispatcher.on_bounce(event, listener, audio);
                let spoke = self
                    .dispatcher
                    .on_character_proximity(event, &mut self.characters, world, audio);
                report.voices.extend(spoke);
            }

            report.retired = self.projectiles.retire_expired(world, dt);
        }

        for character in self.characters.iter_mut() {
            character.model_mut().advance(dt);
        }

        if let Some(world) = self.physics.as_mut() {
            for character in self.characters.iter() {
                if let Err(e) = rig::sync(world, character.model(), character.proxies()) {
                    log::warn!("Bone sync failed for '{}': {}", character.name(), e);
                }
            }
        }

        self.camera.update_split();

        let plan = self.frame_plan();
        renderer.render(&plan);
        audio.update();

        report.live_projectiles = self.projectiles.len();
        if self.frame % 600 == 0 {
            if let Some(world) = &self.physics {
                log::debug!("Frame {}: {}", self.frame, world.debug_info());
            }
        }
        report
    }

    /// Render plan for the current state
    pub fn frame_plan(&self) -> FramePlan {
        compose_frame(
            &self.camera,
            &self.characters,
            &self.projectiles,
            self.debug_mode,
            self.config.rig.bone_radius,
        )
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("frame", &self.frame)
            .field("degraded", &self.is_degraded())
            .field("characters", &self.characters.len())
            .field("projectiles", &self.projectiles.len())
            .field("debug_mode", &self.debug_mode)
            .finish()
    }
}

/// Frame timing from a monotonic clock
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: f32,
}

impl FrameClock {
    /// Clock whose first tick returns zero
    pub fn new(max_delta: f32) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    /// Seconds since the previous call, clamped to `max_delta`
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Same as `tick` with an explicit timestamp. The first call returns 0.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last = Some(now);
        dt.min(self.max_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::HeadlessRenderer;
    use ricochet_audio::NullOutput;
    use ricochet_physics::PhysicsConfig;
    use std::time::Duration;

    fn sim() -> Simulation {
        let world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        Simulation::new(SimConfig::default(), Some(world), CameraPose::default()).unwrap()
    }

    #[test]
    fn test_clock_clamps_spikes() {
        let mut clock = FrameClock::new(0.1);
        let start = Instant::now();
        assert_eq!(clock.tick_at(start), 0.0);
        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-4);
        assert_eq!(clock.tick_at(start + Duration::from_secs(5)), 0.1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimConfig::default();
        config.projectiles.speed = -1.0;
        assert!(Simulation::new(config, None, CameraPose::default()).is_err());
    }

    #[test]
    fn test_degraded_mode_keeps_running() {
        let mut sim = Simulation::new(SimConfig::default(), None, CameraPose::default()).unwrap();
        let mut audio = NullOutput::new();
        let mut renderer = HeadlessRenderer::default();

        assert!(matches!(sim.shoot(), Err(SimError::PhysicsDisabled)));
        assert!(matches!(sim.add_environment(&[0.0; 9], &[0, 1, 2]), Err(SimError::PhysicsDisabled)));

        let input = FrameInput {
            shoot: true,
            ..Default::default()
        };
        let report = sim.tick(1.0 / 60.0, &input, &mut audio, &mut renderer);
        assert!(report.spawned.is_none());
        assert_eq!(report.substeps, 0);
        assert_eq!(renderer.frames, 1);
    }

    #[test]
    fn test_tick_clamps_dt() {
        let mut sim = sim();
        let mut audio = NullOutput::new();
        let mut renderer = HeadlessRenderer::default();
        let report = sim.tick(3.0, &FrameInput::default(), &mut audio, &mut renderer);
        assert_eq!(report.dt, 0.1);
        let report = sim.tick(f32::NAN, &FrameInput::default(), &mut audio, &mut renderer);
        assert_eq!(report.dt, 0.0);
    }

    #[test]
    fn test_shoot_from_camera() {
        let mut sim = sim();
        let input = FrameInput {
            shoot: true,
            ..Default::default()
        };
        let mut audio = NullOutput::new();
        let mut renderer = HeadlessRenderer::default();
        let report = sim.tick(1.0 / 60.0, &input, &mut audio, &mut renderer);
        assert!(report.spawned.is_some());
        assert_eq!(report.live_projectiles, 1);

        let projectile = sim.projectiles().iter().next().unwrap();
        assert!(projectile.transform.position.z < 0.0);
    }

    #[test]
    fn test_toggle_debug_from_input() {
        let mut sim = sim();
        let input = FrameInput {
            toggle_debug: true,
            ..Default::default()
        };
        let mut renderer = HeadlessRenderer::default();
        sim.tick(0.016, &input, &mut NullOutput::new(), &mut renderer);
        assert!(sim.debug_mode());
        assert_eq!(
            renderer.last_plan.unwrap().environment,
            crate::presentation::EnvironmentLayer::CollisionWireframe
        );
    }
}
