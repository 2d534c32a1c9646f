//! Scripted input for unattended demo runs
//!
//! Stands in for keyboard and mouse: captures the pointer on the first
//! frame, pans the view back and forth, walks a square and fires on a timer.

use glam::Vec2;
use ricochet_sim::{FrameInput, KeyState, LockRequest, MoveKey};

/// Seconds spent on each leg of the walk
const LEG_DURATION: f32 = 3.0;
/// Peak yaw rate in radians per second
const PAN_RATE: f32 = 0.5;

const LEGS: [MoveKey; 4] = [MoveKey::Forward, MoveKey::Left, MoveKey::Back, MoveKey::Right];

#[derive(Debug, Clone)]
pub struct Autopilot {
    fire_interval: f32,
    elapsed: f32,
    since_shot: f32,
    started: bool,
}

impl Autopilot {
    pub fn new(fire_interval: f32) -> Self {
        Self {
            fire_interval,
            elapsed: 0.0,
            since_shot: 0.0,
            started: false,
        }
    }

    /// Input for a frame that lasted `dt` seconds
    pub fn next_input(&mut self, dt: f32) -> FrameInput {
        self.elapsed += dt;
        self.since_shot += dt;

        let lock = if self.started {
            None
        } else {
            self.started = true;
            Some(LockRequest::Lock)
        };

        let shoot = self.fire_interval > 0.0 && self.since_shot >= self.fire_interval;
        if shoot {
            self.since_shot = 0.0;
        }

        FrameInput {
            keys: KeyState::holding(&[self.current_leg()]),
            lock,
            look: Vec2::new(PAN_RATE * dt * (self.elapsed * 0.4).sin(), 0.0),
            shoot,
            toggle_debug: false,
        }
    }

    fn current_leg(&self) -> MoveKey {
        let leg = (self.elapsed / LEG_DURATION) as usize % LEGS.len();
        LEGS[leg]
    }
}
