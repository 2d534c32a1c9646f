//! Interfaces to the scene and animation collaborators

use glam::Vec3;

/// Index of a bone within its model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoneId(pub u32);

impl BoneId {
    /// Position in the skeleton's bone list
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Read access to a model's skeleton
pub trait BoneSource {
    /// Every bone, depth-first with parents before children
    fn bones(&self) -> Vec<BoneId>;

    /// Current world-space position of a bone
    fn bone_world_position(&self, bone: BoneId) -> Option<Vec3>;
}

/// Something driven by elapsed time
pub trait Animated {
    fn advance(&mut self, dt: f32);
}

/// A character's visual model: a skeleton that animates
pub trait CharacterModel: BoneSource + Animated {}

impl<T: BoneSource + Animated> CharacterModel for T {}
