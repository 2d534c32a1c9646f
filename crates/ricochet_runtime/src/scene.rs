//! Demo scene - arena geometry and animated characters

use glam::{Quat, Vec3};
use ricochet_sim::{AnimatedSkeleton, AnimationClip, BonePose, Skeleton, TrackQuat, TrackVec3};

/// Half extent of the arena floor
pub const ARENA_HALF_SIZE: f32 = 12.0;
pub const WALL_HEIGHT: f32 = 3.0;

/// Flat vertex buffer and triangle indices for a static mesh
#[derive(Debug, Clone, Default)]
pub struct MeshBuffers {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a quad given in counter-clockwise order seen from its front
    fn push_quad(&mut self, corners: [Vec3; 4]) {
        let base = self.vertex_count() as u32;
        for corner in corners {
            self.vertices.extend_from_slice(&corner.to_array());
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Floor plus four walls facing inwards
pub fn arena() -> MeshBuffers {
    let s = ARENA_HALF_SIZE;
    let h = WALL_HEIGHT;
    let mut mesh = MeshBuffers::default();

    mesh.push_quad([
        Vec3::new(-s, 0.0, -s),
        Vec3::new(-s, 0.0, s),
        Vec3::new(s, 0.0, s),
        Vec3::new(s, 0.0, -s),
    ]);
    // north, south, west, east
    mesh.push_quad([
        Vec3::new(-s, 0.0, -s),
        Vec3::new(s, 0.0, -s),
        Vec3::new(s, h, -s),
        Vec3::new(-s, h, -s),
    ]);
    mesh.push_quad([
        Vec3::new(s, 0.0, s),
        Vec3::new(-s, 0.0, s),
        Vec3::new(-s, h, s),
        Vec3::new(s, h, s),
    ]);
    mesh.push_quad([
        Vec3::new(-s, 0.0, s),
        Vec3::new(-s, 0.0, -s),
        Vec3::new(-s, h, -s),
        Vec3::new(-s, h, s),
    ]);
    mesh.push_quad([
        Vec3::new(s, 0.0, -s),
        Vec3::new(s, 0.0, s),
        Vec3::new(s, h, s),
        Vec3::new(s, h, -s),
    ]);
    mesh
}

/// Simple upright rig: hips, spine, head and two arms
pub fn humanoid() -> ricochet_sim::Result<Skeleton> {
    let pose = |x: f32, y: f32| BonePose::from_translation(Vec3::new(x, y, 0.0));
    let mut skeleton = Skeleton::new();
    let hips = skeleton.add_bone("hips", None, pose(0.0, 0.9))?;
    let spine = skeleton.add_bone("spine", Some(hips), pose(0.0, 0.4))?;
    skeleton.add_bone("head", Some(spine), pose(0.0, 0.3))?;
    skeleton.add_bone("arm_l", Some(spine), pose(0.25, 0.2))?;
    skeleton.add_bone("arm_r", Some(spine), pose(-0.25, 0.2))?;
    Ok(skeleton)
}

/// Side-to-side lean of the upper body
fn sway(skeleton: &Skeleton) -> AnimationClip {
    let mut clip = AnimationClip::new("sway", 2.0);
    if let Some(spine) = skeleton.find("spine") {
        clip = clip.with_rotation(
            spine,
            TrackQuat {
                times: vec![0.0, 0.5, 1.5, 2.0],
                values: vec![
                    Quat::IDENTITY,
                    Quat::from_rotation_z(0.25),
                    Quat::from_rotation_z(-0.25),
                    Quat::IDENTITY,
                ],
            },
        );
    }
    clip
}

/// A full turn on the spot with a small bob
fn spin(skeleton: &Skeleton) -> AnimationClip {
    let mut clip = AnimationClip::new("spin", 3.0);
    if let Some(hips) = skeleton.find("hips") {
        let turns = (0..=4)
            .map(|i| Quat::from_rotation_y(i as f32 * std::f32::consts::FRAC_PI_2))
            .collect();
        clip = clip
            .with_rotation(
                hips,
                TrackQuat {
                    times: vec![0.0, 0.75, 1.5, 2.25, 3.0],
                    values: turns,
                },
            )
            .with_translation(
                hips,
                TrackVec3 {
                    times: vec![0.0, 1.5, 3.0],
                    values: vec![
                        Vec3::new(0.0, 0.9, 0.0),
                        Vec3::new(0.0, 1.05, 0.0),
                        Vec3::new(0.0, 0.9, 0.0),
                    ],
                },
            );
    }
    clip
}

/// The characters standing in the arena
pub fn characters() -> ricochet_sim::Result<Vec<(&'static str, AnimatedSkeleton)>> {
    let sentry_rig = humanoid()?;
    let sentry_clip = sway(&sentry_rig);
    let sentry = AnimatedSkeleton::new(sentry_rig)
        .with_placement(Vec3::new(-2.0, 0.0, -3.0), Quat::from_rotation_y(0.4))
        .with_animation(sentry_clip);

    let dancer_rig = humanoid()?;
    let dancer_clip = spin(&dancer_rig);
    let dancer = AnimatedSkeleton::new(dancer_rig)
        .with_placement(Vec3::new(2.5, 0.0, -2.5), Quat::IDENTITY)
        .with_animation(dancer_clip);

    Ok(vec![("sentry", sentry), ("dancer", dancer)])
}
