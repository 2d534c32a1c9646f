//! Runtime Configuration
//!
//! Everything the demo needs at boot: physics and simulation tuning, how long
//! to run, and where the sound assets live.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. First positional command line argument: path to a TOML file
//! 2. Environment variable: `RICOCHET_CONFIG=/path/to/ricochet.toml`
//! 3. `ricochet.toml` in the working directory
//! 4. Built-in defaults
//!
//! Single values can then be overridden with `RICOCHET_FRAMES`,
//! `RICOCHET_SEED`, `RICOCHET_SPLIT` and `RICOCHET_DEBUG`.
//!
//! # Example Config File
//!
//! ```toml
//! [demo]
//! frames = 1800
//! fire_interval = 0.75
//! split_view = false
//!
//! [audio]
//! bounce = "assets/audio/bounce.wav"
//! voices = ["assets/audio/ouch.wav", "assets/audio/hey.wav"]
//! ambience = "assets/audio/wind.ogg"
//! voice_volume = 0.8
//!
//! [physics]
//! timestep = 0.016666668
//! step_mode = "fixed"
//!
//! [sim]
//! bounce_threshold = 2.0
//!
//! [sim.projectiles]
//! speed = 15.0
//! max_live = 64
//! ```

use ricochet_physics::PhysicsConfig;
use ricochet_sim::SimConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "ricochet.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How the demo session runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Stop after this many frames; run until Ctrl+C when unset
    pub frames: Option<u64>,
    /// Target frame rate of the pacing loop
    pub target_fps: u32,
    /// Seconds between automatic shots
    pub fire_interval: f32,
    /// Give up on physics after this many milliseconds
    pub physics_init_timeout_ms: u64,
    pub split_view: bool,
    pub debug: bool,
    /// Initial camera position
    pub camera_position: [f32; 3],
    /// Point the camera looks at on start
    pub camera_target: [f32; 3],
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: None,
            target_fps: 60,
            fire_interval: 0.75,
            physics_init_timeout_ms: 5_000,
            split_view: false,
            debug: false,
            camera_position: [0.0, 1.6, 4.0],
            camera_target: [0.0, 1.0, 0.0],
        }
    }
}

impl DemoConfig {
    pub fn physics_init_timeout(&self) -> Duration {
        Duration::from_millis(self.physics_init_timeout_ms)
    }

    /// Wall-clock duration of one frame at the target rate
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }
}

/// Sound asset paths
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioAssets {
    pub bounce: Option<String>,
    pub voices: Vec<String>,
    /// Background loop started with the session
    pub ambience: Option<String>,
    pub master_volume: Option<f32>,
    pub effects_volume: Option<f32>,
    pub voice_volume: Option<f32>,
}

/// Full runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub demo: DemoConfig,
    pub audio: AudioAssets,
    pub physics: PhysicsConfig,
    pub sim: SimConfig,

    /// File the configuration was read from
    #[serde(skip)]
    pub config_path: Option<String>,
}

impl RuntimeConfig {
    /// Load configuration from all sources
    pub fn load() -> Self {
        let arg = std::env::args().skip(1).find(|a| !a.starts_with("--"));
        let env = std::env::var("RICOCHET_CONFIG").ok().filter(|p| !p.is_empty());

        let mut config = match arg.or(env) {
            Some(path) => match Self::load_from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("{}, using defaults", e);
                    Self::default()
                }
            },
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_file(DEFAULT_CONFIG_FILE).unwrap_or_else(|e| {
                    log::warn!("{}, using defaults", e);
                    Self::default()
                })
            }
            None => Self::default(),
        };

        config.apply_env();
        config
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_string());
        log::info!("Loaded config from {}", path);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self) {
        if let Some(frames) = std::env::var("RICOCHET_FRAMES").ok().and_then(|v| v.parse().ok()) {
            self.demo.frames = Some(frames);
        }
        if let Some(seed) = std::env::var("RICOCHET_SEED").ok().and_then(|v| v.parse().ok()) {
            self.sim.seed = seed;
        }
        if env_flag("RICOCHET_SPLIT") {
            self.demo.split_view = true;
        }
        if env_flag("RICOCHET_DEBUG") {
            self.demo.debug = true;
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        log::info!("Ricochet Configuration:");
        match self.demo.frames {
            Some(frames) => log::info!("  Frames: {}", frames),
            None => log::info!("  Frames: until Ctrl+C"),
        }
        log::info!(
            "  Physics: {:?} step {:.4}s, gravity {:?}",
            self.physics.step_mode,
            self.physics.timestep,
            self.physics.gravity
        );
        log::info!(
            "  Projectiles: speed {}, max live {}, max age {}s",
            self.sim.projectiles.speed,
            self.sim.projectiles.max_live,
            self.sim.projectiles.max_age
        );
        log::info!("  Split view: {}, Debug: {}", self.demo.split_view, self.demo.debug);
        log::info!(
            "  Audio: bounce={:?}, {} voice clip(s)",
            self.audio.bounce,
            self.audio.voices.len()
        );
        if let Some(path) = &self.config_path {
            log::info!("  Config: {}", path);
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ricochet_physics::StepMode;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.demo.frames, None);
        assert_eq!(config.demo.target_fps, 60);
        assert!(!config.demo.split_view);
        assert!(config.audio.bounce.is_none());
        assert!(config.sim.validate().is_ok());
        assert!(config.physics.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [demo]
            frames = 120
            split_view = true

            [physics]
            step_mode = "variable"

            [sim.projectiles]
            max_live = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.demo.frames, Some(120));
        assert!(config.demo.split_view);
        assert_eq!(config.demo.fire_interval, 0.75);
        assert_eq!(config.physics.step_mode, StepMode::Variable);
        assert_eq!(config.physics.max_substeps, 4);
        assert_eq!(config.sim.projectiles.max_live, 8);
        assert_eq!(config.sim.projectiles.speed, 15.0);
        assert_eq!(config.sim.bounce_threshold, 2.0);
    }

    #[test]
    fn test_audio_assets() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [audio]
            bounce = "bounce.wav"
            voices = ["a.wav", "b.wav"]
            effects_volume = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.audio.bounce.as_deref(), Some("bounce.wav"));
        assert_eq!(config.audio.voices.len(), 2);
        assert_eq!(config.audio.effects_volume, Some(0.5));
        assert!(config.audio.ambience.is_none());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = RuntimeConfig::from_toml_str("[demo]\nframes = \"lots\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = RuntimeConfig::load_from_file("/nonexistent/ricochet.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_frame_interval() {
        let demo = DemoConfig {
            target_fps: 50,
            ..Default::default()
        };
        assert_eq!(demo.frame_interval(), Duration::from_millis(20));
        assert_eq!(demo.physics_init_timeout(), Duration::from_secs(5));
    }
}
