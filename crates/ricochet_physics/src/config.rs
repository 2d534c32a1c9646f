//! Physics configuration

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// How `PhysicsWorld::step` turns frame time into simulation ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMode {
    /// Whole `timestep` ticks drained from an accumulator
    #[default]
    Fixed,
    /// One tick per frame using the frame's elapsed time
    Variable,
}

/// Physics world configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 in Y)
    pub gravity: [f32; 3],

    /// Fixed timestep for physics simulation
    pub timestep: f32,

    /// Step cadence
    pub step_mode: StepMode,

    /// Maximum number of substeps per frame (fixed mode)
    pub max_substeps: u32,

    /// Largest single tick accepted in variable mode
    pub max_variable_step: f32,

    /// Allow continuous collision detection on bodies that request it
    pub ccd_enabled: bool,

    /// Solver iterations for velocity
    pub velocity_iterations: usize,

    /// Allow inactive bodies to sleep
    pub sleeping_enabled: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            timestep: 1.0 / 60.0,
            step_mode: StepMode::Fixed,
            max_substeps: 4,
            max_variable_step: 1.0 / 20.0,
            ccd_enabled: true,
            velocity_iterations: 4,
            sleeping_enabled: true,
        }
    }
}

impl PhysicsConfig {
    /// Configuration that steps once per frame with the frame's delta
    pub fn variable() -> Self {
        Self {
            step_mode: StepMode::Variable,
            ..Default::default()
        }
    }

    /// Set gravity
    pub fn with_gravity(mut self, x: f32, y: f32, z: f32) -> Self {
        self.gravity = [x, y, z];
        self
    }

    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set maximum substeps per frame
    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps;
        self
    }

    /// Check that the configuration can drive a world
    pub fn validate(&self) -> Result<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if !(self.max_variable_step.is_finite() && self.max_variable_step > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "max_variable_step must be positive, got {}",
                self.max_variable_step
            )));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::InvalidConfig("max_substeps must be at least 1".into()));
        }
        if self.velocity_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "velocity_iterations must be at least 1".into(),
            ));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "gravity must be finite, got {:?}",
                self.gravity
            )));
        }
        Ok(())
    }
}
