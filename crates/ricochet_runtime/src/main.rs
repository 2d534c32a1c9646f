//! Ricochet Runtime
//!
//! Boots the demo: loads configuration, brings up physics and audio, builds
//! the arena and its characters, then drives the frame loop until the frame
//! budget runs out or Ctrl+C is pressed.
//!
//! Physics and audio are both optional at runtime. If physics does not come
//! up in time the demo keeps running without projectiles or bone proxies; if
//! no audio device is available sounds go to a silent output.
//!
//! Run with: cargo run -p ricochet_runtime
//!       or: cargo run --bin ricochet -- path/to/ricochet.toml

mod autopilot;
mod config;
mod scene;

use autopilot::Autopilot;
use config::{AudioAssets, RuntimeConfig};

use glam::Vec3;
use ricochet_audio::{
    AudioOutput, AudioSystem, Channel, ClipId, NullOutput, PlaybackHandle, PlaybackSettings,
};
use ricochet_physics::PhysicsWorld;
use ricochet_sim::{CameraPose, FrameClock, HeadlessRenderer, Simulation};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = RuntimeConfig::load();
    config.print_summary();

    if let Err(e) = run(&config) {
        log::error!("Ricochet stopped: {}", e);
        std::process::exit(1);
    }
}

/// Sound output plus the clips the simulation triggers
struct AudioSetup {
    output: Box<dyn AudioOutput>,
    bounce: Option<ClipId>,
    voices: Vec<ClipId>,
    ambience: Option<PlaybackHandle>,
}

/// Open the audio device and load the configured clips.
///
/// Missing devices or files never stop the demo; they only make it quieter.
fn open_audio(assets: &AudioAssets) -> AudioSetup {
    let mut system = match AudioSystem::new() {
        Ok(system) => system,
        Err(e) => {
            log::warn!("{}, continuing without sound", e);
            return AudioSetup {
                output: Box::new(NullOutput::new()),
                bounce: None,
                voices: Vec::new(),
                ambience: None,
            };
        }
    };

    if let Some(volume) = assets.master_volume {
        system.set_master_volume(volume);
    }
    if let Some(volume) = assets.effects_volume {
        system.set_channel_volume(Channel::Effects, volume);
    }
    if let Some(volume) = assets.voice_volume {
        system.set_channel_volume(Channel::Voice, volume);
    }

    let mut load = |path: &str| match system.library_mut().load_file(path) {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    };
    let bounce = assets.bounce.as_deref().and_then(&mut load);
    let voices: Vec<ClipId> = assets.voices.iter().filter_map(|p| load(p.as_str())).collect();
    let ambience_clip = assets.ambience.as_deref().and_then(&mut load);

    log::info!(
        "Audio ready: {} clip(s) loaded",
        system.library().len()
    );

    let ambience = ambience_clip.and_then(|clip| {
        let settings = PlaybackSettings::new().looping().on_channel(Channel::Ambience);
        system.play(clip, &settings)
    });

    AudioSetup {
        output: Box::new(system),
        bounce,
        voices,
        ambience,
    }
}

fn run(config: &RuntimeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let physics = match PhysicsWorld::init_with_timeout(
        config.physics.clone(),
        config.demo.physics_init_timeout(),
    ) {
        Ok(world) => Some(world),
        Err(e) => {
            log::error!("Physics unavailable: {}", e);
            None
        }
    };

    let demo = &config.demo;
    let camera = CameraPose::looking_at(
        Vec3::from_array(demo.camera_position),
        Vec3::from_array(demo.camera_target),
    );
    let mut sim = Simulation::new(config.sim.clone(), physics, camera)?;

    let mut audio = open_audio(&config.audio);
    sim.set_bounce_clip(audio.bounce);
    sim.set_debug_mode(demo.debug);
    sim.set_split_view(demo.split_view);

    // Scene
    let arena = scene::arena();
    match sim.add_environment(&arena.vertices, &arena.indices) {
        Ok(_) => log::info!("Arena loaded: {} triangles", arena.triangle_count()),
        Err(e) => log::warn!("Arena has no collision: {}", e),
    }
    for (name, model) in scene::characters()? {
        sim.add_character(name, Box::new(model), audio.voices.clone())?;
    }

    // Install signal handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("Received Ctrl+C, shutting down...");
        r.store(false, Ordering::SeqCst);
    }) {
        log::warn!("Failed to set Ctrl+C handler: {}", e);
    }

    log::info!("Ricochet running. Press Ctrl+C to exit.");

    let mut clock = FrameClock::new(sim.config().max_frame_delta);
    let mut pilot = Autopilot::new(demo.fire_interval);
    let mut renderer = HeadlessRenderer::default();
    let frame_interval = demo.frame_interval();
    let mut stats = RunStats::default();

    while running.load(Ordering::SeqCst) {
        if demo.frames.is_some_and(|limit| sim.frame() >= limit) {
            break;
        }

        let dt = clock.tick();
        let input = pilot.next_input(dt);
        let report = sim.tick(dt, &input, audio.output.as_mut(), &mut renderer);

        for bounce in &report.bounces {
            log::debug!(
                "Bounce {:?} at {:.2?} ({:.1} m/s)",
                bounce.projectile,
                bounce.position,
                bounce.velocity.length()
            );
        }
        stats.record(&report);

        std::thread::sleep(frame_interval);
    }

    stats.print_summary(&sim);

    log::info!("Stopping {} active sound(s)", audio.output.active_sound_count());
    if let Some(handle) = audio.ambience.take() {
        audio.output.stop(handle);
    }
    audio.output.stop_all();
    Ok(())
}

/// Totals reported at shutdown
#[derive(Debug, Default)]
struct RunStats {
    shots: usize,
    bounces: usize,
    voices: usize,
    retired: usize,
}

impl RunStats {
    fn record(&mut self, report: &ricochet_sim::FrameReport) {
        self.shots += usize::from(report.spawned.is_some());
        self.bounces += report.bounces.len();
        self.voices += report.voices.len();
        self.retired += report.retired;
    }

    fn print_summary(&self, sim: &Simulation) {
        log::info!("Session finished after {} frames", sim.frame());
        log::info!(
            "  Shots: {}, Bounces: {}, Voice lines: {}, Retired: {}",
            self.shots,
            self.bounces,
            self.voices,
            self.retired
        );
        if let Some(world) = sim.physics() {
            log::info!("  {}", world.debug_info());
        }
    }
}
