//! Analytic fakes for the host collaborators and a harness that drives the
//! engine the way a host would.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use momentum_audio::AudioSink;
use momentum_core::{EntityId, Transform};
use momentum_physics::{ColliderTag, QueryMask, RayHit, RigidBodyControl, SpatialQuery, SweepHit};

use crate::collab::{AnimationDriver, Collaborators, EffectsSink, ShakePreset};
use crate::combat::{HitSide, SmashSize};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::input::InputEvent;
use crate::scene::{Enemy, GrapplePoint, Scene};

const GRAVITY: f32 = 9.81;
/// Resting height of the character centre on flat ground
const STANDING_HEIGHT: f32 = 0.9;

/// One-sided plane `normal . x = offset`, solid on the negative side
#[derive(Debug, Clone, Copy)]
struct Plane {
    normal: Vec3,
    offset: f32,
    tag: ColliderTag,
    layer: QueryMask,
}

#[derive(Debug, Clone, Copy)]
struct Sphere {
    center: Vec3,
    radius: f32,
    tag: ColliderTag,
    layer: QueryMask,
}

/// Rigid body plus a world made of planes and spheres
#[derive(Debug)]
pub(crate) struct FakePhysics {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub gravity: bool,
    pub kinematic: bool,
    pub impulses: Vec<(Vec3, Vec3)>,
    planes: Vec<Plane>,
    spheres: Vec<Sphere>,
}

impl FakePhysics {
    fn new(position: Vec3) -> Self {
        let mut physics = Self {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            gravity: true,
            kinematic: false,
            impulses: Vec::new(),
            planes: Vec::new(),
            spheres: Vec::new(),
        };
        physics.add_plane(Vec3::Y, 0.0, ColliderTag::World, QueryMask::WORLD);
        physics
    }

    pub fn add_plane(&mut self, normal: Vec3, offset: f32, tag: ColliderTag, layer: QueryMask) {
        self.planes.push(Plane {
            normal: normal.normalize(),
            offset,
            tag,
            layer,
        });
    }

    pub fn add_sphere(&mut self, center: Vec3, radius: f32, tag: ColliderTag, layer: QueryMask) {
        self.spheres.push(Sphere {
            center,
            radius,
            tag,
            layer,
        });
    }

    pub fn facing(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Integrate one step and keep the body on the floor
    pub fn step(&mut self, dt: f32) {
        if self.kinematic {
            return;
        }
        if self.gravity {
            self.velocity.y -= GRAVITY * dt;
        }
        self.position += self.velocity * dt;
        if self.position.y < STANDING_HEIGHT {
            self.position.y = STANDING_HEIGHT;
            self.velocity.y = self.velocity.y.max(0.0);
        }
    }

    /// Earliest travel of a sphere of `radius` along `direction` before it
    /// touches something, with the contact point
    fn first_contact(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: QueryMask,
    ) -> Option<(f32, Vec3, ColliderTag)> {
        let mut best: Option<(f32, Vec3, ColliderTag)> = None;
        let mut consider = |travel: f32, contact: Vec3, tag: ColliderTag| {
            if travel <= max_distance && best.map_or(true, |(t, _, _)| travel < t) {
                best = Some((travel, contact, tag));
            }
        };

        for plane in self.planes.iter().filter(|p| mask.contains(p.layer)) {
            let height = plane.normal.dot(origin) - plane.offset;
            let approach = plane.normal.dot(direction);
            if height < 0.0 || approach >= -1e-6 {
                continue;
            }
            let travel = ((height - radius) / -approach).max(0.0);
            let contact = origin + direction * travel - plane.normal * radius;
            consider(travel, contact, plane.tag);
        }

        for sphere in self.spheres.iter().filter(|s| mask.contains(s.layer)) {
            let reach = radius + sphere.radius;
            let offset = origin - sphere.center;
            let b = offset.dot(direction);
            let c = offset.length_squared() - reach * reach;
            if c > 0.0 && b > 0.0 {
                continue;
            }
            let discriminant = b * b - c;
            if discriminant < 0.0 {
                continue;
            }
            let travel = (-b - discriminant.sqrt()).max(0.0);
            let centre = origin + direction * travel;
            let contact = centre + (sphere.center - centre).normalize_or_zero() * radius;
            consider(travel, contact, sphere.tag);
        }

        best
    }
}

impl SpatialQuery for FakePhysics {
    fn sweep(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: QueryMask,
    ) -> Option<SweepHit> {
        let direction = direction.try_normalize()?;
        self.first_contact(origin, radius, direction, max_distance, mask)
            .map(|(_, point, tag)| SweepHit {
                point,
                distance: origin.distance(point),
                tag,
            })
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: QueryMask,
    ) -> Option<RayHit> {
        let direction = direction.try_normalize()?;
        self.first_contact(origin, 0.0, direction, max_distance, mask)
            .map(|(distance, point, tag)| RayHit {
                point,
                distance,
                tag,
            })
    }
}

impl RigidBodyControl for FakePhysics {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn gravity_enabled(&self) -> bool {
        self.gravity
    }

    fn set_gravity_enabled(&mut self, enabled: bool) {
        self.gravity = enabled;
    }

    fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
    }

    fn apply_impulse_at_point(&mut self, impulse: Vec3, point: Vec3) {
        self.impulses.push((impulse, point));
        self.velocity += impulse;
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingAnimation {
    pub triggers: Vec<String>,
    pub bools: HashMap<String, bool>,
    pub floats: HashMap<String, f32>,
    pub ints: HashMap<String, i32>,
}

impl AnimationDriver for RecordingAnimation {
    fn set_trigger(&mut self, name: &str) {
        self.triggers.push(name.to_string());
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.bools.insert(name.to_string(), value);
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    fn set_integer(&mut self, name: &str, value: i32) {
        self.ints.insert(name.to_string(), value);
    }

    fn get_float(&self, name: &str) -> f32 {
        self.floats.get(name).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingAudio {
    pub events: Vec<String>,
    pub switches: Vec<(String, String)>,
    pub parameters: HashMap<String, f32>,
}

impl AudioSink for RecordingAudio {
    fn post_event(&mut self, name: &str, _subject: EntityId) {
        self.events.push(name.to_string());
    }

    fn set_switch(&mut self, group: &str, value: &str, _subject: EntityId) {
        self.switches.push((group.to_string(), value.to_string()));
    }

    fn set_parameter(&mut self, name: &str, value: f32, _subject: EntityId) {
        self.parameters.insert(name.to_string(), value);
    }
}

#[derive(Debug)]
pub(crate) struct RecordingEffects {
    pub visible: bool,
    pub trail: bool,
    pub hand: Option<Transform>,
    pub highlights: HashMap<EntityId, bool>,
    pub sparks: bool,
    pub shakes: Vec<ShakePreset>,
    pub smashes: Vec<Vec3>,
    pub landings: Vec<Vec3>,
    pub hits: Vec<Vec3>,
}

impl Default for RecordingEffects {
    fn default() -> Self {
        Self {
            visible: true,
            trail: false,
            hand: None,
            highlights: HashMap::new(),
            sparks: false,
            shakes: Vec::new(),
            smashes: Vec::new(),
            landings: Vec::new(),
            hits: Vec::new(),
        }
    }
}

impl EffectsSink for RecordingEffects {
    fn set_character_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_dash_trail(&mut self, active: bool) {
        self.trail = active;
    }

    fn set_grapple_hand(&mut self, pose: Option<Transform>) {
        self.hand = pose;
    }

    fn set_grapple_highlight(&mut self, point: EntityId, highlighted: bool) {
        self.highlights.insert(point, highlighted);
    }

    fn set_grind_sparks(&mut self, active: bool) {
        self.sparks = active;
    }

    fn shake(&mut self, preset: ShakePreset) {
        self.shakes.push(preset);
    }

    fn ground_smash(&mut self, position: Vec3) {
        self.smashes.push(position);
    }

    fn landing_burst(&mut self, position: Vec3) {
        self.landings.push(position);
    }

    fn hit_burst(&mut self, position: Vec3) {
        self.hits.push(position);
    }
}

/// Engine plus recording collaborators. The character starts on flat ground
/// facing -Z.
pub(crate) struct Harness {
    pub engine: Engine,
    pub physics: FakePhysics,
    pub animation: RecordingAnimation,
    pub audio: RecordingAudio,
    pub effects: RecordingEffects,
    pub scene: Scene,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Character ten units up, not yet grounded
    pub fn airborne() -> Self {
        let mut h = Self::new();
        h.physics.position = Vec3::new(0.0, 10.0, 0.0);
        h
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let spawn = Vec3::new(0.0, STANDING_HEIGHT, 0.0);
        let engine = Engine::new(config, Transform::from_position(spawn))
            .expect("test config is valid");
        Self {
            engine,
            physics: FakePhysics::new(spawn),
            animation: RecordingAnimation::default(),
            audio: RecordingAudio::default(),
            effects: RecordingEffects::default(),
            scene: Scene::new(),
        }
    }

    fn with_engine<R>(&mut self, f: impl FnOnce(&mut Engine, &mut Collaborators<'_>) -> R) -> R {
        let Harness {
            engine,
            physics,
            animation,
            audio,
            effects,
            scene,
        } = self;
        let mut collab = Collaborators {
            physics,
            animation,
            audio,
            effects,
            scene,
        };
        f(engine, &mut collab)
    }

    pub fn input(&mut self, event: InputEvent) {
        self.with_engine(|engine, collab| engine.on_input(&event, collab));
    }

    /// One engine tick followed by one physics step
    pub fn tick(&mut self) {
        self.with_engine(|engine, collab| engine.tick(collab));
        let dt = self.engine.config().tick_length;
        self.physics.step(dt);
    }

    pub fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    pub fn end_dash(&mut self) {
        self.with_engine(|engine, collab| engine.end_dash(collab));
    }

    pub fn respawn(&mut self) {
        self.with_engine(|engine, collab| engine.respawn(collab));
    }

    pub fn rail_contact(&mut self, rail: EntityId, contact: Vec3) -> bool {
        self.with_engine(|engine, collab| engine.rail_contact(rail, contact, collab))
    }

    pub fn begin_attack(&mut self) {
        self.with_engine(|engine, collab| engine.begin_attack(collab));
    }

    pub fn next_attack(&mut self) {
        self.with_engine(|engine, collab| engine.next_attack(collab));
    }

    pub fn end_attack(&mut self) {
        self.with_engine(|engine, collab| engine.end_attack(collab));
    }

    pub fn activate_hit_collider(&mut self, side: HitSide) {
        self.engine.activate_hit_collider(side);
    }

    /// A punch collider touched something tagged `tag`
    pub fn punch(&mut self, side: HitSide, tag: ColliderTag) -> bool {
        let point = self.physics.position + self.physics.facing();
        self.with_engine(|engine, collab| engine.punch_contact(side, tag, point, collab))
    }

    pub fn smash_ground(&mut self, size: SmashSize) -> Vec<EntityId> {
        self.with_engine(|engine, collab| engine.smash_ground(size, collab))
    }

    pub fn register_karnage_hit(&mut self) {
        self.with_engine(|engine, collab| engine.register_karnage_hit(collab));
    }

    /// Enemy with 20 health and a half-unit body on the enemy layer
    pub fn add_enemy(&mut self, name: &str, position: Vec3) -> EntityId {
        let id = self.scene.add_enemy(Enemy::new(name, position, 20.0));
        self.physics
            .add_sphere(position, 0.5, ColliderTag::Entity(id), QueryMask::ENEMY);
        id
    }

    pub fn add_grapple_point(&mut self, position: Vec3, attach_point: Vec3) -> EntityId {
        let id = self
            .scene
            .add_grapple_point(GrapplePoint::new(position, attach_point));
        self.physics
            .add_sphere(position, 0.5, ColliderTag::Entity(id), QueryMask::GRAPPLE);
        id
    }
}
