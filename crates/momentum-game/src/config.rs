//! Tunables for the character, camera and combat systems.
//!
//! Angles are in degrees, distances in meters, durations in seconds and
//! speeds in meters per second unless a field says otherwise.

use std::collections::HashMap;

use momentum_core::CurveType;
use serde::{Deserialize, Serialize};

use crate::action::{validate_order, ActionKind};
use crate::error::EngineError;

/// Character locomotion and special-movement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    pub max_health: f32,

    /// Walking speed; also the Moving/Running classification threshold
    pub speed: f32,
    pub sprint_speed: f32,
    /// Seconds to blend from the current to the target speed
    pub acceleration_lerp: f32,
    /// Maximum turn per tick in degrees
    pub rotation_speed: f32,
    /// Airborne acceleration along the input direction
    pub air_speed: f32,
    pub jump_force: f32,

    pub dash_speed: f32,
    pub dash_distance: f32,
    pub time_between_dashes: f32,
    pub dash_curve: CurveType,
    /// Radius of the obstacle sweep that limits a dash
    pub dash_sweep_radius: f32,

    pub grapple_range: f32,
    /// Base hand speed; the hand travels at twice this
    pub grapple_speed: f32,
    /// Screen-centre radius for grapple candidates, percent of half the screen height
    pub grapple_screen_radius: f32,
    /// Idle time after which the last grapple point may be targeted again
    pub grapple_forget_time: f32,

    pub grind_speed: f32,
    /// Height of the character above the rail sample
    pub grind_vertical_offset: f32,
    /// How long a rail that was just left is ignored
    pub rail_ignore_time: f32,

    pub ground_probe_radius: f32,
    pub ground_probe_distance: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            speed: 6.0,
            sprint_speed: 10.0,
            acceleration_lerp: 0.3,
            rotation_speed: 15.0,
            air_speed: 10.0,
            jump_force: 7.0,
            dash_speed: 30.0,
            dash_distance: 5.0,
            time_between_dashes: 0.5,
            dash_curve: CurveType::EaseOutQuad,
            dash_sweep_radius: 0.3,
            grapple_range: 25.0,
            grapple_speed: 20.0,
            grapple_screen_radius: 30.0,
            grapple_forget_time: 1.0,
            grind_speed: 12.0,
            grind_vertical_offset: 1.0,
            rail_ignore_time: 1.0,
            ground_probe_radius: 0.2,
            ground_probe_distance: 1.08,
        }
    }
}

/// Perspective parameters used to project points to the screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lens {
    /// Vertical field of view in degrees
    pub fov_y: f32,
    /// Width over height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov_y: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Horizontal shoulder offset
    pub offset_x: f32,
    /// Vertical offset of the look-at anchor above the character
    pub offset_y: f32,
    /// Elevation used when the camera is re-seated behind the character
    pub default_height: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    /// Radius of the sweep keeping the camera out of walls
    pub collision_radius: f32,
    pub initial_distance: f32,

    pub idle_distance: f32,
    pub move_distance: f32,
    pub sprint_distance: f32,
    /// Rotation rate in degrees per second when look input starts
    pub initial_rotation_speed: f32,
    /// Rotation rate reached after `rotation_lerp_time`
    pub final_rotation_speed: f32,
    pub rotation_curve: CurveType,
    pub rotation_lerp_time: f32,
    /// Range in which enemies become the ambient combat target
    pub combat_range: f32,
    /// Half-height of the vertical band enemies must be in to be considered
    pub combat_band: f32,
    pub inverted_x: bool,
    pub inverted_y: bool,

    /// Look-down angle while locked on
    pub target_angle: f32,
    pub target_distance: f32,
    /// Lock-on radius around screen centre, percent of half the screen height
    pub target_radius: f32,

    /// Slerp rate while grinding
    pub grind_rotation_speed: f32,

    pub lens: Lens,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset_x: 0.5,
            offset_y: 1.5,
            default_height: 20.0,
            min_pitch: -10.0,
            max_pitch: 85.0,
            collision_radius: 0.1,
            initial_distance: 8.0,
            idle_distance: 4.0,
            move_distance: 5.0,
            sprint_distance: 7.0,
            initial_rotation_speed: 60.0,
            final_rotation_speed: 180.0,
            rotation_curve: CurveType::EaseInQuad,
            rotation_lerp_time: 0.5,
            combat_range: 6.0,
            combat_band: 1.0,
            inverted_x: false,
            inverted_y: false,
            target_angle: 20.0,
            target_distance: 6.0,
            target_radius: 30.0,
            grind_rotation_speed: 5.0,
            lens: Lens::default(),
        }
    }
}

/// Per-attack resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Distance at which the strike connects without closing in
    pub attack_range: f32,
    /// Farthest target the attack will dash to
    pub max_dash_distance: f32,
    /// Whether out-of-range targets are closed in on with a dash
    pub dash_to_target: bool,
    pub impulse: f32,
    pub air_impulse: f32,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            attack_range: 1.5,
            max_dash_distance: 6.0,
            dash_to_target: true,
            impulse: 4.0,
            air_impulse: 2.0,
        }
    }
}

/// Karnage meter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KarnageConfig {
    /// Points lost per second while karnage mode is on
    pub decrease_speed: f32,
    pub max_points: f32,
    /// Hits needed to turn karnage mode on
    pub max_combo: u32,
    /// Seconds per combo step once the rest period is over
    pub max_timer: f32,
    /// Rest period after a hit before the combo starts decaying
    pub time_before_decrease: f32,
}

impl Default for KarnageConfig {
    fn default() -> Self {
        Self {
            decrease_speed: 10.0,
            max_points: 100.0,
            max_combo: 10,
            max_timer: 2.0,
            time_before_decrease: 3.0,
        }
    }
}

/// Combat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub max_combo: u32,
    /// Cooldown after a full combo before attacking is allowed again
    pub time_between_combos: f32,
    /// Window after an attack ends in which the combo can continue
    pub time_to_reset_combo: f32,
    pub weak: AttackConfig,
    pub heavy: AttackConfig,
    pub punch_damage: f32,
    pub small_smash_range: f32,
    pub big_smash_range: f32,
    pub small_smash_damage: f32,
    pub big_smash_damage: f32,
    /// Half-height of the vertical band a smash reaches
    pub smash_band: f32,
    pub karnage: KarnageConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            max_combo: 3,
            time_between_combos: 0.6,
            time_to_reset_combo: 0.4,
            weak: AttackConfig::default(),
            heavy: AttackConfig {
                attack_range: 2.0,
                impulse: 6.0,
                air_impulse: 3.0,
                ..AttackConfig::default()
            },
            punch_damage: 5.0,
            small_smash_range: 3.0,
            big_smash_range: 6.0,
            small_smash_damage: 10.0,
            big_smash_damage: 20.0,
            smash_band: 1.0,
            karnage: KarnageConfig::default(),
        }
    }
}

/// Tick order and input routing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub order: Vec<ActionKind>,
    /// Input action name to handler
    pub bindings: HashMap<String, ActionKind>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        let bindings = [
            ("Move", ActionKind::Movement),
            ("Sprint", ActionKind::Sprint),
            ("Jump", ActionKind::Jump),
            ("Dash", ActionKind::Dash),
            ("Grapple", ActionKind::Grapple),
            ("WeakAttack", ActionKind::WeakAttack),
            ("HeavyAttack", ActionKind::HeavyAttack),
            ("Look", ActionKind::CameraFree),
            ("Target", ActionKind::CameraTargeted),
            ("ResetCamera", ActionKind::CameraReset),
        ]
        .into_iter()
        .map(|(name, kind)| (name.to_string(), kind))
        .collect();

        Self {
            order: ActionKind::DEFAULT_ORDER.to_vec(),
            bindings,
        }
    }
}

/// Everything the coordination engine is configured with
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed tick length in seconds
    pub tick_length: f32,
    pub character: CharacterConfig,
    pub camera: CameraConfig,
    pub combat: CombatConfig,
    pub dispatch: DispatchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_length: 1.0 / 50.0,
            character: CharacterConfig::default(),
            camera: CameraConfig::default(),
            combat: CombatConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Reject values the controllers cannot work with
    pub fn validate(&self) -> Result<(), EngineError> {
        let c = &self.character;
        let cam = &self.camera;
        let combat = &self.combat;

        let positive = [
            ("tick_length", self.tick_length),
            ("character.speed", c.speed),
            ("character.sprint_speed", c.sprint_speed),
            ("character.acceleration_lerp", c.acceleration_lerp),
            ("character.rotation_speed", c.rotation_speed),
            ("character.dash_speed", c.dash_speed),
            ("character.dash_distance", c.dash_distance),
            ("character.grapple_range", c.grapple_range),
            ("character.grapple_speed", c.grapple_speed),
            ("character.grind_speed", c.grind_speed),
            ("character.ground_probe_distance", c.ground_probe_distance),
            ("camera.rotation_lerp_time", cam.rotation_lerp_time),
            ("camera.initial_distance", cam.initial_distance),
            ("camera.target_distance", cam.target_distance),
            ("camera.lens.fov_y", cam.lens.fov_y),
            ("camera.lens.aspect", cam.lens.aspect),
            ("combat.karnage.max_timer", combat.karnage.max_timer),
            ("combat.karnage.max_points", combat.karnage.max_points),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(EngineError::InvalidConfig {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }

        let non_negative = [
            ("character.time_between_dashes", c.time_between_dashes),
            ("character.dash_sweep_radius", c.dash_sweep_radius),
            ("character.rail_ignore_time", c.rail_ignore_time),
            ("combat.time_between_combos", combat.time_between_combos),
            ("combat.time_to_reset_combo", combat.time_to_reset_combo),
            ("combat.karnage.time_before_decrease", combat.karnage.time_before_decrease),
            ("combat.karnage.decrease_speed", combat.karnage.decrease_speed),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(EngineError::InvalidConfig {
                    field,
                    reason: format!("must not be negative, got {value}"),
                });
            }
        }

        if combat.max_combo == 0 {
            return Err(EngineError::InvalidConfig {
                field: "combat.max_combo",
                reason: "must allow at least one attack".to_string(),
            });
        }
        if combat.karnage.max_combo == 0 {
            return Err(EngineError::InvalidConfig {
                field: "combat.karnage.max_combo",
                reason: "must be at least one hit".to_string(),
            });
        }
        if cam.min_pitch >= cam.max_pitch || cam.min_pitch <= -90.0 || cam.max_pitch >= 90.0 {
            return Err(EngineError::InvalidConfig {
                field: "camera.min_pitch",
                reason: format!(
                    "pitch band [{}, {}] must be increasing and within (-90, 90)",
                    cam.min_pitch, cam.max_pitch
                ),
            });
        }

        validate_order(&self.dispatch.order)
    }
}
