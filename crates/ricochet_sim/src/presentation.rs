//! Per-frame render plan
//!
//! What to draw is recomputed from simulation state every frame, so toggling
//! debug mode can never leave stale debug geometry behind.

use crate::camera::CameraRig;
use crate::character::CharacterRegistry;
use crate::projectile::{ProjectileTracker, VisualTransform};
use glam::Vec3;

/// Which representation of the environment to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentLayer {
    Detailed,
    CollisionWireframe,
}

/// Normalized screen rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge, 0 to 1
    pub x: f32,
    /// Top edge, 0 to 1
    pub y: f32,
    /// Fraction of the screen width
    pub width: f32,
    /// Fraction of the screen height
    pub height: f32,
}

impl Viewport {
    /// Whole screen
    pub const FULL: Viewport = Viewport {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };
    /// Left half, used by the primary view when split
    pub const LEFT_HALF: Viewport = Viewport {
        x: 0.0,
        y: 0.0,
        width: 0.5,
        height: 1.0,
    };
    /// Right half, used by the second view
    pub const RIGHT_HALF: Viewport = Viewport {
        x: 0.5,
        y: 0.0,
        width: 0.5,
        height: 1.0,
    };
}

/// One camera rendered into one viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPass {
    /// Camera to render from
    pub camera: crate::camera::CameraPose,
    /// Where on screen
    pub viewport: Viewport,
}

/// Bone collider drawn in debug mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugSphere {
    /// World position of the bone
    pub center: Vec3,
    /// Collider radius
    pub radius: f32,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    /// One or two views
    pub views: Vec<ViewPass>,
    /// Which environment layer to draw
    pub environment: EnvironmentLayer,
    /// Bone colliders; empty outside debug mode
    pub bone_spheres: Vec<DebugSphere>,
    /// Live projectile spheres
    pub projectiles: Vec<VisualTransform>,
}

/// Draws frame plans
pub trait Renderer {
    fn render(&mut self, plan: &FramePlan);
}

/// Renderer that only counts frames
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    /// Frames presented so far
    pub frames: u64,
    /// Most recent plan
    pub last_plan: Option<FramePlan>,
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, plan: &FramePlan) {
        self.frames += 1;
        self.last_plan = Some(plan.clone());
    }
}

/// Build the frame plan from current state
pub fn compose_frame(
    rig: &CameraRig,
    characters: &CharacterRegistry,
    projectiles: &ProjectileTracker,
    debug_mode: bool,
    bone_radius: f32,
) -> FramePlan {
    let views = match rig.secondary() {
        Some(second) => vec![
            ViewPass {
                camera: *rig.primary(),
                viewport: Viewport::LEFT_HALF,
            },
            ViewPass {
                camera: *second,
                viewport: Viewport::RIGHT_HALF,
            },
        ],
        None => vec![ViewPass {
            camera: *rig.primary(),
            viewport: Viewport::FULL,
        }],
    };

    let (environment, bone_spheres) = if debug_mode {
        let spheres = characters
            .iter()
            .flat_map(|c| {
                c.proxies()
                    .iter()
                    .filter_map(move |p| c.model().bone_world_position(p.bone))
            })
            .map(|center| DebugSphere {
                center,
                radius: bone_radius,
            })
            .collect();
        (EnvironmentLayer::CollisionWireframe, spheres)
    } else {
        (EnvironmentLayer::Detailed, Vec::new())
    };

    FramePlan {
        views,
        environment,
        bone_spheres,
        projectiles: projectiles.iter().map(|p| p.transform).collect(),
    }
}
