//! The shared character and camera records every handler reads and writes.
//!
//! Both live inside [`Blackboard`], which the engine owns and lends to each
//! handler for the duration of one call.

use glam::Vec3;
use momentum_core::{Countdown, EntityId, Transform};
use serde::{Deserialize, Serialize};

use crate::config::{CameraConfig, EngineConfig};

/// Locomotion classification, derived each tick from planar speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementState {
    #[default]
    Stopped,
    Moving,
    Running,
    Grinding,
}

/// Attack combo progress
#[derive(Debug, Clone, PartialEq)]
pub struct ComboState {
    /// Attacks landed in the current combo, 0..=max
    pub index: u32,
    pub max: u32,
    pub attack_allowed: bool,
    /// Running after a full combo; attacking resumes when it fires
    pub reset_timer: Countdown,
    /// Running after an attack ends; the combo is dropped when it fires
    pub margin_timer: Countdown,
    /// The current attack clip chains into the next one
    pub chained_animation: bool,
}

impl ComboState {
    pub fn new(max: u32) -> Self {
        Self {
            index: 0,
            max,
            attack_allowed: true,
            reset_timer: Countdown::new(),
            margin_timer: Countdown::new(),
            chained_animation: false,
        }
    }
}

/// Karnage special meter
#[derive(Debug, Clone, PartialEq)]
pub struct KarnageMeter {
    /// Consecutive hits counted toward karnage mode
    pub combo: u32,
    /// Grace period after a hit; the combo does not decay while it runs
    pub rest: Countdown,
    /// Time until the combo loses one step
    pub step: Countdown,
    pub on: bool,
    pub points: f32,
}

impl KarnageMeter {
    pub fn new(rest_time: f32, step_time: f32) -> Self {
        let mut rest = Countdown::new();
        rest.start(rest_time);
        let mut step = Countdown::new();
        step.start(step_time);
        Self {
            combo: 0,
            rest,
            step,
            on: false,
            points: 0.0,
        }
    }

    /// True while the post-hit grace period is running
    pub fn is_resting(&self) -> bool {
        self.rest.is_active()
    }
}

/// Rail-following progress
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathFollow {
    /// Distance along the current rail
    pub distance: f32,
    pub backwards: bool,
    /// Rail currently ridden
    pub current: Option<EntityId>,
    /// Rail just left; contacts with it are ignored until the timer fires
    pub ignored: Option<EntityId>,
    pub ignore_timer: Countdown,
}

impl PathFollow {
    pub fn is_grinding(&self) -> bool {
        self.current.is_some()
    }
}

/// The character record
#[derive(Debug, Clone)]
pub struct CharacterState {
    /// Subject id used for audio and hit attribution
    pub id: EntityId,
    pub movement_state: MovementState,

    pub grounded: bool,
    pub movement_allowed: bool,
    pub sprinting: bool,
    /// Set only by the dash state machine, together with model visibility
    pub invincible: bool,
    pub jumped: bool,
    /// Velocity comes from the attack animation instead of input
    pub anim_override_movement: bool,
    /// Forward speed sampled from the attack animation
    pub anim_forward_movement: f32,

    /// Camera-relative planar input direction; length is the stick magnitude
    pub direction: Vec3,

    pub health: f32,
    pub max_health: f32,

    pub combo: ComboState,
    pub karnage: KarnageMeter,
    pub path: PathFollow,
}

impl CharacterState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            id: EntityId::new(),
            movement_state: MovementState::Stopped,
            grounded: false,
            movement_allowed: true,
            sprinting: false,
            invincible: false,
            jumped: false,
            anim_override_movement: false,
            anim_forward_movement: 0.0,
            direction: Vec3::ZERO,
            health: config.character.max_health,
            max_health: config.character.max_health,
            combo: ComboState::new(config.combat.max_combo),
            karnage: KarnageMeter::new(
                config.combat.karnage.time_before_decrease,
                config.combat.karnage.max_timer,
            ),
            path: PathFollow::default(),
        }
    }

    /// Apply incoming damage unless invincible. Health never drops below 0.
    pub fn take_hit(&mut self, damage: f32) {
        if self.invincible {
            return;
        }
        self.health = (self.health - damage.max(0.0)).max(0.0);
    }

    pub fn is_grinding(&self) -> bool {
        self.movement_state == MovementState::Grinding
    }
}

/// Active camera behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraMode {
    #[default]
    Free,
    Targeted,
    Grinding,
}

/// The camera record
#[derive(Debug, Clone)]
pub struct CameraState {
    pub mode: CameraMode,
    /// Unit vector from the look-at anchor toward the camera
    pub point: Vec3,
    pub transform: Transform,
    /// Follow distance, eased toward the movement-dependent distance
    pub current_distance: f32,
    /// Distance actually used this tick after collision clamping
    pub applied_distance: f32,
    /// Eased look-down angle while locked on
    pub current_angle: f32,
    /// Lock-on or ambient combat target, looked up by id on every use
    pub targeted_enemy: Option<EntityId>,
}

impl CameraState {
    /// Seat the camera behind `character`, raised by the default height
    pub fn new(character: &Transform, config: &CameraConfig) -> Self {
        let point = raised(-character.forward(), config.default_height);
        let anchor = character.position + Vec3::Y * config.offset_y;
        let mut transform = Transform::from_position(anchor + point * config.initial_distance);
        transform.look_at(anchor);

        Self {
            mode: CameraMode::Free,
            point,
            transform,
            current_distance: config.initial_distance,
            applied_distance: config.initial_distance,
            current_angle: config.target_angle,
            targeted_enemy: None,
        }
    }
}

/// Both shared records
#[derive(Debug, Clone)]
pub struct Blackboard {
    pub character: CharacterState,
    pub camera: CameraState,
}

/// Flatten `direction` and tilt it upward by `degrees`
pub fn raised(direction: Vec3, degrees: f32) -> Vec3 {
    let flat = momentum_core::planar(direction).normalize_or_zero();
    let flat = if flat == Vec3::ZERO { Vec3::Z } else { flat };
    let angle = degrees.to_radians();
    (flat * angle.cos() + Vec3::Y * angle.sin()).normalize()
}

/// Elevation of a unit direction above the ground plane, in degrees
pub fn elevation(direction: Vec3) -> f32 {
    direction.normalize_or_zero().y.clamp(-1.0, 1.0).asin().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_hit_respects_invincibility() {
        let mut character = CharacterState::new(&EngineConfig::default());
        character.take_hit(30.0);
        assert_eq!(character.health, 70.0);

        character.invincible = true;
        character.take_hit(30.0);
        assert_eq!(character.health, 70.0);

        character.invincible = false;
        character.take_hit(500.0);
        assert_eq!(character.health, 0.0);
    }

    #[test]
    fn test_camera_starts_behind_character() {
        let config = CameraConfig::default();
        let camera = CameraState::new(&Transform::default(), &config);
        // character faces -Z so the camera sits on +Z, raised
        assert!(camera.point.z > 0.0);
        assert!((elevation(camera.point) - config.default_height).abs() < 1e-3);
        assert_eq!(camera.mode, CameraMode::Free);
    }

    #[test]
    fn test_raised_keeps_heading() {
        let point = raised(Vec3::new(3.0, 5.0, 0.0), 30.0);
        assert!((point.length() - 1.0).abs() < 1e-5);
        assert!((elevation(point) - 30.0).abs() < 1e-3);
        assert!(point.x > 0.0 && point.z.abs() < 1e-5);
    }
}
