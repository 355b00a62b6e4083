//! Momentum Physics - Spatial queries and rigid body access using rapier3d
//!
//! The gameplay controllers only see the [`SpatialQuery`] and
//! [`RigidBodyControl`] traits. [`PhysicsWorld`] is the rapier-backed world and
//! [`CharacterRig`] is the view of it handed to the engine each tick.

mod error;
mod query;
mod rig;

pub use error::PhysicsError;
pub use query::{
    CharacterPhysics, ColliderTag, QueryMask, RayHit, RigidBodyControl, SpatialQuery, SweepHit,
};
pub use rig::{CharacterBodyConfig, CharacterRig};

use std::collections::HashMap;

use glam::Vec3;
use nalgebra::Unit;
use rapier3d::parry::query::{PointQuery, ShapeCastOptions};
use rapier3d::parry::shape::Ball;
use rapier3d::prelude::*;

/// Physics world configuration
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 on Y axis)
    pub gravity: Vec3,
    /// Physics timestep (default: 1/50, matching the gameplay tick)
    pub timestep: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            timestep: 1.0 / 50.0,
        }
    }
}

/// The main physics world containing all simulation state
pub struct PhysicsWorld {
    /// Configuration
    pub config: PhysicsConfig,

    /// Rigid body storage
    pub rigid_body_set: RigidBodySet,
    /// Collider storage
    pub collider_set: ColliderSet,
    /// Impulse joint storage
    pub impulse_joint_set: ImpulseJointSet,
    /// Multi-body joint storage
    pub multibody_joint_set: MultibodyJointSet,

    /// Integration parameters
    integration_parameters: IntegrationParameters,
    /// Physics pipeline
    physics_pipeline: PhysicsPipeline,
    /// Island manager
    island_manager: IslandManager,
    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,
    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,
    /// Continuous collision detection solver
    ccd_solver: CCDSolver,
    /// Query pipeline for raycasts and shape casts
    query_pipeline: QueryPipeline,

    /// Scene identity of tagged colliders
    tags: HashMap<ColliderHandle, ColliderTag>,
    /// The player character body, once spawned
    character: Option<RigidBodyHandle>,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;

        Self {
            config,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            tags: HashMap::new(),
            character: None,
        }
    }

    /// Step the physics simulation
    pub fn step(&mut self) {
        let gravity = vector![self.config.gravity.x, self.config.gravity.y, self.config.gravity.z];

        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        self.update_queries();
    }

    /// Refresh the query pipeline after colliders were added or moved
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a static collider on the given layer
    pub fn add_static_collider(
        &mut self,
        collider: Collider,
        layer: QueryMask,
        tag: ColliderTag,
    ) -> ColliderHandle {
        let mut collider = collider;
        collider.set_collision_groups(layer_groups(layer));
        let handle = self.collider_set.insert(collider);
        if tag != ColliderTag::World {
            self.tags.insert(handle, tag);
        }
        handle
    }

    /// Add a dynamic rigid body with a collider
    pub fn add_dynamic_body(
        &mut self,
        rigid_body: RigidBody,
        collider: Collider,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let rb_handle = self.rigid_body_set.insert(rigid_body);
        let col_handle =
            self.collider_set
                .insert_with_parent(collider, rb_handle, &mut self.rigid_body_set);
        (rb_handle, col_handle)
    }

    /// Remove a collider
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.tags.remove(&handle);
        self.collider_set
            .remove(handle, &mut self.island_manager, &mut self.rigid_body_set, true);
    }

    /// Get a collider by handle
    pub fn get_collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.collider_set.get(handle)
    }

    /// Scene identity of a collider; untagged colliders are level geometry
    pub fn tag_of(&self, handle: ColliderHandle) -> ColliderTag {
        self.tags.get(&handle).copied().unwrap_or_default()
    }

    /// Spawn the player character as a dynamic capsule standing at `position`
    pub fn spawn_character(&mut self, config: &CharacterBodyConfig, position: Vec3) -> RigidBodyHandle {
        let center = position + Vec3::Y * config.height * 0.5;
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![center.x, center.y, center.z])
            .lock_rotations()
            .ccd_enabled(true)
            .build();

        let half_height = (config.height - 2.0 * config.radius) / 2.0;
        let collider = ColliderBuilder::capsule_y(half_height.max(0.01), config.radius)
            .friction(0.0)
            .restitution(0.0)
            .mass(config.mass)
            .collision_groups(layer_groups(QueryMask::CHARACTER))
            .build();

        let (handle, _) = self.add_dynamic_body(body, collider);
        self.character = Some(handle);
        tracing::debug!(?position, "spawned character body");
        handle
    }

    /// View of the world centred on the character body
    pub fn character_rig(&mut self) -> Result<CharacterRig<'_>, PhysicsError> {
        let handle = self.character.ok_or(PhysicsError::NoCharacter)?;
        if !self.rigid_body_set.contains(handle) {
            return Err(PhysicsError::MissingBody(handle));
        }
        Ok(CharacterRig::new(self, handle))
    }

    /// Cast a ray and return the first hit
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: QueryMask,
    ) -> Option<RayHit> {
        self.raycast_filtered(origin, direction, max_distance, query_filter(mask, None))
    }

    /// Sweep a sphere and return the first contact
    pub fn sweep(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: QueryMask,
    ) -> Option<SweepHit> {
        self.sweep_filtered(origin, radius, direction, max_distance, query_filter(mask, None))
    }

    pub(crate) fn raycast_filtered(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<RayHit> {
        let direction = direction.try_normalize()?;
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray(&self.rigid_body_set, &self.collider_set, &ray, max_distance, true, filter)
            .map(|(handle, toi)| RayHit {
                point: origin + direction * toi,
                distance: toi,
                tag: self.tag_of(handle),
            })
    }

    pub(crate) fn sweep_filtered(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<SweepHit> {
        let direction = direction.try_normalize()?;
        let shape = Ball::new(radius);
        let shape_pos = Isometry::translation(origin.x, origin.y, origin.z);
        let shape_vel = vector![direction.x, direction.y, direction.z];
        let options = ShapeCastOptions::with_max_time_of_impact(max_distance);

        let (handle, hit) = self.query_pipeline.cast_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &shape_pos,
            &shape_vel,
            &shape,
            options,
            filter,
        )?;

        // Contact point is the closest surface point to the sphere centre at impact
        let collider = self.collider_set.get(handle)?;
        let centre = origin + direction * hit.time_of_impact;
        let projection =
            collider
                .shape()
                .project_point(collider.position(), &point![centre.x, centre.y, centre.z], true);
        let point = Vec3::new(projection.point.x, projection.point.y, projection.point.z);

        Some(SweepHit {
            point,
            distance: origin.distance(point),
            tag: self.tag_of(handle),
        })
    }

    /// Create a ground plane collider
    pub fn create_ground(&mut self, y: f32) -> ColliderHandle {
        let normal = Unit::new_normalize(vector![0.0, 1.0, 0.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, y, 0.0])
            .friction(0.7)
            .restitution(0.0)
            .build();
        self.add_static_collider(ground, QueryMask::WORLD, ColliderTag::World)
    }

    /// Create a static box collider
    pub fn create_static_box(&mut self, half_extents: Vec3, position: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![position.x, position.y, position.z])
            .friction(0.7)
            .build();
        self.add_static_collider(collider, QueryMask::WORLD, ColliderTag::World)
    }

    /// Create a tagged sphere standing in for an enemy or grapple point
    pub fn create_tagged_sphere(
        &mut self,
        position: Vec3,
        radius: f32,
        layer: QueryMask,
        tag: ColliderTag,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius)
            .translation(vector![position.x, position.y, position.z])
            .build();
        self.add_static_collider(collider, layer, tag)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Colliders belong to one layer and collide with everything
fn layer_groups(layer: QueryMask) -> InteractionGroups {
    InteractionGroups::new(Group::from_bits_truncate(layer.0), Group::ALL)
}

/// Queries see every collider whose layer is in `mask`
pub(crate) fn query_filter(mask: QueryMask, exclude: Option<RigidBodyHandle>) -> QueryFilter<'static> {
    let filter =
        QueryFilter::default().groups(InteractionGroups::new(Group::ALL, Group::from_bits_truncate(mask.0)));
    match exclude {
        Some(body) => filter.exclude_rigid_body(body),
        None => filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use momentum_core::EntityId;

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.config.gravity, Vec3::new(0.0, -9.81, 0.0));
    }

    #[test]
    fn test_raycast_hits_ground() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        world.update_queries();

        let hit = world
            .raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 100.0, QueryMask::ALL)
            .expect("ground below");
        assert!((hit.distance - 10.0).abs() < 1e-3);
        assert!(hit.point.y.abs() < 1e-3);
        assert_eq!(hit.tag, ColliderTag::World);
    }

    #[test]
    fn test_sweep_reports_contact_distance() {
        let mut world = PhysicsWorld::new();
        world.create_static_box(Vec3::splat(0.5), Vec3::new(5.0, 0.0, 0.0));
        world.update_queries();

        let hit = world
            .sweep(Vec3::ZERO, 0.3, Vec3::X, 10.0, QueryMask::WORLD)
            .expect("box in the lane");
        assert!((hit.distance - 4.5).abs() < 1e-2, "distance {}", hit.distance);
        assert!((hit.point.x - 4.5).abs() < 1e-2);

        assert!(world.sweep(Vec3::ZERO, 0.3, Vec3::X, 3.0, QueryMask::WORLD).is_none());
    }

    #[test]
    fn test_mask_filters_layers() {
        let mut world = PhysicsWorld::new();
        let id = EntityId::new();
        world.create_tagged_sphere(Vec3::new(0.0, 0.0, -4.0), 0.5, QueryMask::ENEMY, ColliderTag::Entity(id));
        world.update_queries();

        assert!(world.raycast(Vec3::ZERO, -Vec3::Z, 10.0, QueryMask::WORLD).is_none());
        let hit = world
            .raycast(Vec3::ZERO, -Vec3::Z, 10.0, QueryMask::ENEMY)
            .expect("enemy ahead");
        assert!(hit.tag.is_entity(id));
    }

    #[test]
    fn test_rig_requires_character() {
        let mut world = PhysicsWorld::new();
        assert!(matches!(world.character_rig(), Err(PhysicsError::NoCharacter)));

        world.spawn_character(&CharacterBodyConfig::default(), Vec3::ZERO);
        assert!(world.character_rig().is_ok());
    }
}
