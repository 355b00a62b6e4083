//! The character's view of the physics world

use glam::{Quat, Vec3};
use nalgebra::{Quaternion, UnitQuaternion};
use rapier3d::prelude::{point, vector, RigidBodyHandle, RigidBodyType};

use crate::query::{QueryMask, RayHit, RigidBodyControl, SpatialQuery, SweepHit};
use crate::{query_filter, PhysicsWorld};

/// Character body configuration
#[derive(Debug, Clone)]
pub struct CharacterBodyConfig {
    /// Capsule height (default: 1.8m)
    pub height: f32,
    /// Capsule radius (default: 0.4m)
    pub radius: f32,
    /// Body mass in kilograms
    pub mass: f32,
}

impl Default for CharacterBodyConfig {
    fn default() -> Self {
        Self {
            height: 1.8,
            radius: 0.4,
            mass: 70.0,
        }
    }
}

/// Mutable view of the world for one engine call.
///
/// Queries made through the rig never report the character's own collider.
pub struct CharacterRig<'w> {
    world: &'w mut PhysicsWorld,
    body: RigidBodyHandle,
}

impl<'w> CharacterRig<'w> {
    pub(crate) fn new(world: &'w mut PhysicsWorld, body: RigidBodyHandle) -> Self {
        Self { world, body }
    }

    /// Handle of the character body
    pub fn handle(&self) -> RigidBodyHandle {
        self.body
    }

    fn body(&self) -> Option<&rapier3d::dynamics::RigidBody> {
        self.world.rigid_body_set.get(self.body)
    }

    fn body_mut(&mut self) -> Option<&mut rapier3d::dynamics::RigidBody> {
        self.world.rigid_body_set.get_mut(self.body)
    }
}

impl SpatialQuery for CharacterRig<'_> {
    fn sweep(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: QueryMask,
    ) -> Option<SweepHit> {
        self.world.sweep_filtered(
            origin,
            radius,
            direction,
            max_distance,
            query_filter(mask, Some(self.body)),
        )
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: QueryMask,
    ) -> Option<RayHit> {
        self.world
            .raycast_filtered(origin, direction, max_distance, query_filter(mask, Some(self.body)))
    }
}

impl RigidBodyControl for CharacterRig<'_> {
    fn position(&self) -> Vec3 {
        self.body().map_or(Vec3::ZERO, |body| {
            let t = body.translation();
            Vec3::new(t.x, t.y, t.z)
        })
    }

    fn set_position(&mut self, position: Vec3) {
        if let Some(body) = self.body_mut() {
            body.set_translation(vector![position.x, position.y, position.z], true);
        }
    }

    fn rotation(&self) -> Quat {
        self.body().map_or(Quat::IDENTITY, |body| to_glam_quat(body.rotation()))
    }

    fn set_rotation(&mut self, rotation: Quat) {
        if let Some(body) = self.body_mut() {
            body.set_rotation(to_unit_quaternion(rotation), true);
        }
    }

    fn linear_velocity(&self) -> Vec3 {
        self.body().map_or(Vec3::ZERO, |body| {
            let v = body.linvel();
            Vec3::new(v.x, v.y, v.z)
        })
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        if let Some(body) = self.body_mut() {
            body.set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
        }
    }

    fn gravity_enabled(&self) -> bool {
        self.body().is_some_and(|body| body.gravity_scale() != 0.0)
    }

    fn set_gravity_enabled(&mut self, enabled: bool) {
        if let Some(body) = self.body_mut() {
            body.set_gravity_scale(if enabled { 1.0 } else { 0.0 }, true);
        }
    }

    fn is_kinematic(&self) -> bool {
        self.body().is_some_and(|body| body.is_kinematic())
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        let body_type = if kinematic {
            RigidBodyType::KinematicPositionBased
        } else {
            RigidBodyType::Dynamic
        };
        if let Some(body) = self.body_mut() {
            body.set_body_type(body_type, true);
        }
    }

    fn apply_impulse_at_point(&mut self, impulse: Vec3, at: Vec3) {
        if let Some(body) = self.body_mut() {
            body.apply_impulse_at_point(
                vector![impulse.x, impulse.y, impulse.z],
                point![at.x, at.y, at.z],
                true,
            );
        }
    }
}

fn to_glam_quat(rotation: &UnitQuaternion<f32>) -> Quat {
    let c = rotation.coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

fn to_unit_quaternion(rotation: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(rotation.w, rotation.x, rotation.y, rotation.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_character() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        world.spawn_character(&CharacterBodyConfig::default(), Vec3::ZERO);
        world.update_queries();
        world
    }

    #[test]
    fn test_quaternion_conversion() {
        let rotation = Quat::from_rotation_y(1.2);
        let back = to_glam_quat(&to_unit_quaternion(rotation));
        assert!(rotation.angle_between(back) < 1e-4);
    }

    #[test]
    fn test_rig_queries_skip_own_body() {
        let mut world = world_with_character();
        world.create_static_box(Vec3::splat(0.5), Vec3::new(5.0, 0.9, 0.0));
        world.update_queries();

        let rig = world.character_rig().expect("character spawned");
        let origin = rig.position();
        let hit = rig
            .sweep(origin, 0.3, Vec3::X, 10.0, QueryMask::WORLD)
            .expect("box in the lane");
        assert!((hit.distance - 4.5).abs() < 1e-2);
    }

    #[test]
    fn test_gravity_toggle_holds_velocity() {
        let mut world = world_with_character();
        {
            let mut rig = world.character_rig().expect("character spawned");
            rig.set_position(Vec3::new(0.0, 10.0, 0.0));
            rig.set_gravity_enabled(false);
            rig.set_linear_velocity(Vec3::ZERO);
            assert!(!rig.gravity_enabled());
        }
        world.step();

        let rig = world.character_rig().expect("character spawned");
        assert!(rig.linear_velocity().length() < 1e-4);
    }

    #[test]
    fn test_kinematic_toggle() {
        let mut world = world_with_character();
        let mut rig = world.character_rig().expect("character spawned");
        rig.set_kinematic(true);
        assert!(rig.is_kinematic());
        rig.set_kinematic(false);
        assert!(!rig.is_kinematic());
    }
}
