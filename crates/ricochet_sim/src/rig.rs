//! Bone proxies - kinematic physics stand-ins for skeletal bones

use crate::error::Result;
use crate::scene::{BoneId, BoneSource};
use ricochet_physics::{
    ColliderDesc, ColliderHandle, ColliderShape, PhysicsWorld, RigidBodyDesc, RigidBodyHandle,
};

/// Physics body following one bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneProxy {
    /// Bone being followed
    pub bone: BoneId,
    /// Kinematic body that tracks the bone
    pub body: RigidBodyHandle,
    /// Sphere collider on the body
    pub collider: ColliderHandle,
}

/// Create one kinematic sphere per bone at its current world position.
///
/// A model without bones yields an empty list.
pub fn bind<M: BoneSource + ?Sized>(
    world: &mut PhysicsWorld,
    model: &M,
    radius: f32,
) -> Result<Vec<BoneProxy>> {
    let bones = model.bones();
    let mut proxies = Vec::with_capacity(bones.len());

    for bone in bones {
        let Some(position) = model.bone_world_position(bone) else {
            log::debug!("Bone {:?} has no world position, not binding it", bone);
            continue;
        };

        let body = world.create_body(RigidBodyDesc::bone_proxy().with_position(position));
        let collider = world.create_collider(
            ColliderDesc::new(ColliderShape::sphere(radius))
                .with_collision_events()
                .with_user_data(bone.0 as u128),
            Some(body),
        )?;
        proxies.push(BoneProxy { bone, body, collider });
    }

    log::debug!("Bound {} bone proxies", proxies.len());
    Ok(proxies)
}

/// Push every bone's current world position as its proxy's kinematic target.
///
/// Returns the number of proxies updated.
pub fn sync<M: BoneSource + ?Sized>(
    world: &mut PhysicsWorld,
    model: &M,
    proxies: &[BoneProxy],
) -> Result<usize> {
    let mut synced = 0;
    for proxy in proxies {
        match model.bone_world_position(proxy.bone) {
            Some(position) => {
                world.set_kinematic_target(proxy.body, position)?;
                synced += 1;
            }
            None => log::debug!("Bone {:?} missing from model, skipping sync", proxy.bone),
        }
    }
    Ok(synced)
}

/// Remove every proxy body (and its collider) from the world
pub fn unbind(world: &mut PhysicsWorld, proxies: &[BoneProxy]) -> Result<()> {
    for proxy in proxies {
        world.remove_body(proxy.body)?;
    }
    Ok(())
}
