//! Collider types

use crate::error::{PhysicsError, Result};
use crate::material::PhysicsMaterial;
use rapier3d::prelude as rapier;

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub(crate) rapier::ColliderHandle);

/// Collision shape type
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    /// Sphere with radius
    Sphere { radius: f32 },
    /// Triangle mesh (environment geometry)
    TriMesh {
        vertices: Vec<[f32; 3]>,
        indices: Vec<[u32; 3]>,
    },
}

impl ColliderShape {
    /// Create a sphere shape
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Build a triangle mesh from flat vertex (xyz...) and index buffers.
    pub fn trimesh_from_buffers(vertices: &[f32], indices: &[u32]) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            return Err(PhysicsError::ShapeCreationFailed(format!(
                "vertex buffer length {} is not a multiple of 3",
                vertices.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(PhysicsError::ShapeCreationFailed(format!(
                "index buffer length {} is not a multiple of 3",
                indices.len()
            )));
        }
        if indices.is_empty() {
            return Err(PhysicsError::ShapeCreationFailed(
                "triangle mesh has no triangles".into(),
            ));
        }

        let vertex_count = vertices.len() / 3;
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(PhysicsError::ShapeCreationFailed(format!(
                "index {} out of range for {} vertices",
                bad, vertex_count
            )));
        }

        Ok(Self::TriMesh {
            vertices: vertices.chunks_exact(3).map(|v| [v[0], v[1], v[2]]).collect(),
            indices: indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect(),
        })
    }

    /// Build a Rapier shared shape
    pub(crate) fn to_rapier(&self) -> rapier::SharedShape {
        match self {
            Self::Sphere { radius } => rapier::SharedShape::ball(*radius),
            Self::TriMesh { vertices, indices } => {
                let rapier_verts: Vec<_> = vertices
                    .iter()
                    .map(|v| rapier::Point::new(v[0], v[1], v[2]))
                    .collect();
                rapier::SharedShape::trimesh(rapier_verts, indices.clone())
            }
        }
    }
}

/// Description for creating a collider
#[derive(Debug, Clone)]
pub struct ColliderDesc {
    /// Collision shape
    pub shape: ColliderShape,
    /// Physics material
    pub material: PhysicsMaterial,
    /// Report collision start/stop events for this collider
    pub report_collisions: bool,
    /// User data (owner id, etc.)
    pub user_data: u128,
}

impl ColliderDesc {
    /// Create a new collider description with a shape
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            material: PhysicsMaterial::default(),
            report_collisions: false,
            user_data: 0,
        }
    }

    /// Set material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Enable collision event reporting
    pub fn with_collision_events(mut self) -> Self {
        self.report_collisions = true;
        self
    }

    /// Set user data
    pub fn with_user_data(mut self, data: u128) -> Self {
        self.user_data = data;
        self
    }

    /// Build a Rapier collider builder
    pub(crate) fn to_rapier_builder(&self) -> rapier::ColliderBuilder {
        let events = if self.report_collisions {
            rapier::ActiveEvents::COLLISION_EVENTS
        } else {
            rapier::ActiveEvents::empty()
        };

        rapier::ColliderBuilder::new(self.shape.to_rapier())
            .friction(self.material.friction)
            .restitution(self.material.restitution)
            .restitution_combine_rule(self.material.restitution_combine.into())
            .density(self.material.density)
            .active_events(events)
            .user_data(self.user_data)
    }
}
