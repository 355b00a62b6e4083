//! Query and body-mutation surfaces used by the gameplay controllers.
//!
//! Controllers never see rapier types; they talk to the world through these
//! traits so tests can substitute an analytic world.

use glam::{Quat, Vec3};
use momentum_core::EntityId;

/// Layer bits used to filter spatial queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryMask(pub u32);

impl QueryMask {
    /// Static level geometry
    pub const WORLD: QueryMask = QueryMask(1 << 0);
    /// Enemy bodies
    pub const ENEMY: QueryMask = QueryMask(1 << 1);
    /// Grapple points
    pub const GRAPPLE: QueryMask = QueryMask(1 << 2);
    /// Rail segments
    pub const RAIL: QueryMask = QueryMask(1 << 3);
    /// The player character
    pub const CHARACTER: QueryMask = QueryMask(1 << 4);
    /// Every layer
    pub const ALL: QueryMask = QueryMask(u32::MAX);

    pub fn contains(self, other: QueryMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for QueryMask {
    type Output = QueryMask;

    fn bitor(self, rhs: QueryMask) -> QueryMask {
        QueryMask(self.0 | rhs.0)
    }
}

/// What a query hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColliderTag {
    /// Untagged level geometry
    #[default]
    World,
    /// A scene object the engine knows by id
    Entity(EntityId),
}

impl ColliderTag {
    pub fn is_entity(&self, id: EntityId) -> bool {
        matches!(self, ColliderTag::Entity(hit) if *hit == id)
    }
}

/// Result of a sphere sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// World-space contact point
    pub point: Vec3,
    /// Distance from the sweep origin to the contact point
    pub distance: f32,
    pub tag: ColliderTag,
}

/// Result of a ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    /// Distance along the (normalized) ray
    pub distance: f32,
    pub tag: ColliderTag,
}

/// Sweep and ray tests against the world
pub trait SpatialQuery {
    /// Sweep a sphere of `radius` from `origin` along `direction`. The sphere
    /// centre travels at most `max_distance`.
    fn sweep(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: QueryMask,
    ) -> Option<SweepHit>;

    /// Cast a ray from `origin` along `direction` up to `max_distance`
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: QueryMask,
    ) -> Option<RayHit>;

    /// True when nothing on `mask` lies between `from` and the object tagged `id`
    fn line_of_sight(&self, from: Vec3, to: Vec3, id: EntityId, mask: QueryMask) -> bool {
        let offset = to - from;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return true;
        }
        self.raycast(from, offset / distance, distance + 1.0, mask)
            .is_some_and(|hit| hit.tag.is_entity(id))
    }
}

/// Get/set access to the character's rigid body
pub trait RigidBodyControl {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);

    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);

    fn gravity_enabled(&self) -> bool;
    fn set_gravity_enabled(&mut self, enabled: bool);

    fn is_kinematic(&self) -> bool;
    fn set_kinematic(&mut self, kinematic: bool);

    fn apply_impulse_at_point(&mut self, impulse: Vec3, point: Vec3);

    /// Forward axis of the body (-Z in local space)
    fn forward(&self) -> Vec3 {
        self.rotation() * -Vec3::Z
    }

    fn right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }
}

/// Everything the coordination engine needs from physics
pub trait CharacterPhysics: SpatialQuery + RigidBodyControl {}

impl<T: SpatialQuery + RigidBodyControl + ?Sized> CharacterPhysics for T {}
