//! End-to-end frame loop behaviour

mod common;

use approx::assert_relative_eq;
use common::{floor, DriftingBones, RecordingOutput};
use glam::Vec3;
use ricochet_audio::{Channel, ClipId};
use ricochet_physics::{PhysicsConfig, PhysicsError, PhysicsWorld};
use ricochet_sim::prelude::*;
use std::time::Duration;

const DT: f32 = 1.0 / 60.0;

fn simulation(config: SimConfig) -> Simulation {
    let world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let mut sim = Simulation::new(config, Some(world), CameraPose::default()).unwrap();
    let (vertices, indices) = floor();
    sim.add_environment(&vertices, &indices).unwrap();
    sim
}

fn run(sim: &mut Simulation, frames: usize, audio: &mut RecordingOutput) -> Vec<FrameReport> {
    let mut renderer = HeadlessRenderer::default();
    (0..frames)
        .map(|_| sim.tick(DT, &FrameInput::default(), audio, &mut renderer))
        .collect()
}

#[test]
fn test_spawned_projectile_has_requested_speed() {
    let mut sim = simulation(SimConfig::default());
    sim.camera_mut().primary_mut().position = Vec3::new(0.0, 2.0, 0.0);
    let id = sim.shoot().unwrap();

    let projectile = sim.projectiles().get(id).unwrap();
    let velocity = sim.physics().unwrap().body_linear_velocity(projectile.body).unwrap();
    assert_relative_eq!(velocity.length(), 15.0, epsilon = 1e-4);
    assert_relative_eq!(projectile.last_velocity.length(), 15.0, epsilon = 1e-4);
}

#[test]
fn test_floor_bounce_plays_sound() {
    let mut sim = simulation(SimConfig::default());
    sim.set_bounce_clip(Some(ClipId(0)));

    // Look straight down from two units up
    *sim.camera_mut().primary_mut() =
        CameraPose::looking_at(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 0.0, 0.001));
    sim.shoot().unwrap();

    let mut audio = RecordingOutput::default();
    let reports = run(&mut sim, 90, &mut audio);

    let bounces: Vec<&BounceEvent> = reports.iter().flat_map(|r| r.bounces.iter()).collect();
    assert!(!bounces.is_empty(), "projectile should bounce off the floor");
    assert!(bounces[0].velocity.y > 0.0);

    let effects = audio.on_channel(Channel::Effects);
    assert_eq!(effects.len(), bounces.len());
    for (_, settings) in &audio.played {
        assert!(settings.volume > 0.0 && settings.volume <= 1.0);
        assert!(settings.pitch >= 0.8 * 0.97 && settings.pitch <= 1.2 * 1.03);
    }
    assert_eq!(audio.updates, 90);
}

#[test]
fn test_visual_matches_physics_after_every_frame() {
    let mut sim = simulation(SimConfig::default());
    sim.camera_mut().primary_mut().position = Vec3::new(0.0, 3.0, 0.0);
    sim.shoot().unwrap();

    let mut audio = RecordingOutput::default();
    let mut renderer = HeadlessRenderer::default();
    for _ in 0..30 {
        sim.tick(DT, &FrameInput::default(), &mut audio, &mut renderer);
        let world = sim.physics().unwrap();
        for projectile in sim.projectiles().iter() {
            let state = world.body_state(projectile.body).unwrap();
            assert_eq!(projectile.transform.position, state.position);
            assert_eq!(projectile.transform.orientation, state.orientation);
        }
        let plan = renderer.last_plan.as_ref().unwrap();
        assert_eq!(plan.projectiles.len(), sim.projectiles().len());
    }
}

#[test]
fn test_live_projectiles_capped_and_removed_from_world() {
    let mut config = SimConfig::default();
    config.projectiles.max_live = 4;
    config.projectiles.max_age = 0.5;
    let mut sim = simulation(config);
    sim.camera_mut().primary_mut().position = Vec3::new(0.0, 5.0, 0.0);

    let environment_bodies = sim.physics().unwrap().body_count();
    let mut audio = RecordingOutput::default();
    let mut renderer = HeadlessRenderer::default();
    let shoot = FrameInput {
        shoot: true,
        ..Default::default()
    };

    for _ in 0..10 {
        let report = sim.tick(DT, &shoot, &mut audio, &mut renderer);
        assert!(report.live_projectiles <= 4);
        assert_eq!(
            sim.physics().unwrap().body_count(),
            environment_bodies + sim.projectiles().len()
        );
    }

    // Stop shooting; everything ages out
    run(&mut sim, 60, &mut audio);
    assert!(sim.projectiles().is_empty());
    assert_eq!(sim.physics().unwrap().body_count(), environment_bodies);
}

#[test]
fn test_bone_proxies_follow_animation() {
    let mut sim = simulation(SimConfig::default());
    let model = DriftingBones::at(&[Vec3::new(2.0, 1.0, 0.0), Vec3::new(2.0, 1.5, 0.0)])
        .drifting(Vec3::new(0.0, 0.0, 1.0));
    let id = sim.add_character("walker", Box::new(model), Vec::new()).unwrap();

    let mut audio = RecordingOutput::default();
    run(&mut sim, 10, &mut audio);

    let character = sim.characters().get(id).unwrap();
    assert_eq!(character.proxies().len(), 2);
    let world = sim.physics().unwrap();
    for proxy in character.proxies() {
        let bone = character.model().bone_world_position(proxy.bone).unwrap();
        let target = world.kinematic_target(proxy.body).unwrap();
        assert_relative_eq!(target.z, bone.z, epsilon = 1e-5);
        assert_relative_eq!(target.z, 10.0 * DT, epsilon = 1e-4);
    }
}

#[test]
fn test_bone_proxies_are_never_recreated() {
    let mut sim = simulation(SimConfig::default());
    let model = DriftingBones::at(&[Vec3::ONE, Vec3::new(1.0, 2.0, 1.0), Vec3::new(1.0, 3.0, 1.0)]);
    let id = sim.add_character("statue", Box::new(model), Vec::new()).unwrap();
    let before: Vec<BoneProxy> = sim.characters().get(id).unwrap().proxies().to_vec();
    let bodies = sim.physics().unwrap().body_count();

    let mut audio = RecordingOutput::default();
    run(&mut sim, 30, &mut audio);

    assert_eq!(sim.characters().get(id).unwrap().proxies(), before.as_slice());
    assert_eq!(sim.physics().unwrap().body_count(), bodies);

    sim.remove_character(id).unwrap();
    assert_eq!(sim.physics().unwrap().body_count(), bodies - 3);
    assert!(matches!(sim.remove_character(id), Err(SimError::UnknownCharacter(_))));
}

#[test]
fn test_debug_mode_does_not_touch_physics() {
    let scenario = |debug: bool| {
        let mut sim = simulation(SimConfig::default());
        sim.set_debug_mode(debug);
        let target = DriftingBones::at(&[Vec3::new(0.0, 0.5, -3.0)]);
        sim.add_character("target", Box::new(target), Vec::new()).unwrap();
        *sim.camera_mut().primary_mut() =
            CameraPose::looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.5, -3.0));
        let id = sim.shoot().unwrap();

        let mut audio = RecordingOutput::default();
        let mut renderer = HeadlessRenderer::default();
        for frame in 0..45 {
            let input = FrameInput {
                toggle_debug: frame % 7 == 0,
                ..Default::default()
            };
            sim.tick(DT, &input, &mut audio, &mut renderer);
        }
        let body = sim.projectiles().get(id).unwrap().body;
        sim.physics().unwrap().body_state(body).unwrap()
    };

    assert_eq!(scenario(false), scenario(true));
}

#[test]
fn test_debug_plan_shows_bone_spheres() {
    let mut sim = simulation(SimConfig::default());
    sim.add_character("a", Box::new(DriftingBones::at(&[Vec3::ZERO, Vec3::Y])), Vec::new())
        .unwrap();

    assert!(sim.frame_plan().bone_spheres.is_empty());
    sim.set_debug_mode(true);
    let plan = sim.frame_plan();
    assert_eq!(plan.environment, EnvironmentLayer::CollisionWireframe);
    assert_eq!(plan.bone_spheres.len(), 2);
    assert_eq!(plan.bone_spheres[1].center, Vec3::Y);
}

#[test]
fn test_split_view_tracks_primary_each_frame() {
    let mut sim = simulation(SimConfig::default());
    sim.set_split_view(true);
    sim.movement_mut().lock();

    let input = FrameInput {
        keys: KeyState::holding(&[MoveKey::Forward]),
        ..Default::default()
    };
    let mut audio = RecordingOutput::default();
    let mut renderer = HeadlessRenderer::default();
    for _ in 0..5 {
        sim.tick(DT, &input, &mut audio, &mut renderer);
    }

    let plan = renderer.last_plan.unwrap();
    assert_eq!(plan.views.len(), 2);
    let offset = plan.views[1].camera.position - plan.views[0].camera.position;
    assert_relative_eq!(offset.length(), sim.config().split_offset, epsilon = 1e-5);
    let along_right = offset.dot(sim.camera().primary().right());
    assert_relative_eq!(along_right, sim.config().split_offset, epsilon = 1e-5);
}

#[test]
fn test_lock_input_gates_movement() {
    let mut sim = simulation(SimConfig::default());
    let mut audio = RecordingOutput::default();
    let mut renderer = HeadlessRenderer::default();
    let mut input = FrameInput {
        keys: KeyState::holding(&[MoveKey::Right]),
        ..Default::default()
    };

    let report = sim.tick(DT, &input, &mut audio, &mut renderer);
    assert_eq!(report.movement, MoveOutcome::Idle);

    input.lock = Some(LockRequest::Toggle);
    let report = sim.tick(DT, &input, &mut audio, &mut renderer);
    assert_eq!(report.movement, MoveOutcome::Moved);
    assert_relative_eq!(sim.camera().primary().position.x, 5.0 * DT, epsilon = 1e-5);
}

#[test]
fn test_invalid_physics_config_runs_degraded() {
    let result = PhysicsWorld::init_with_timeout(
        PhysicsConfig::default().with_timestep(0.0),
        Duration::from_secs(5),
    );
    assert!(matches!(result, Err(PhysicsError::InvalidConfig(_))));

    let mut sim = Simulation::new(SimConfig::default(), result.ok(), CameraPose::default()).unwrap();
    assert!(sim.is_degraded());

    let id = sim
        .add_character("ghost", Box::new(DriftingBones::at(&[Vec3::ZERO])), vec![ClipId(1)])
        .unwrap();
    assert!(sim.characters().get(id).unwrap().proxies().is_empty());

    let mut audio = RecordingOutput::default();
    let reports = run(&mut sim, 10, &mut audio);
    assert!(reports.iter().all(|r| r.substeps == 0 && r.bounces.is_empty()));
    assert_eq!(sim.frame(), 10);
}
