//! Collaborator surfaces and the per-call context handed to controllers
//!
//! The engine owns the blackboard; the host owns physics, animation, audio,
//! presentation and the scene. Each engine call bundles mutable borrows of
//! both into a [`TickContext`] that lives only for that call.

use glam::Vec3;
use momentum_audio::AudioSink;
use momentum_core::{EntityId, Transform};
use momentum_physics::CharacterPhysics;

use crate::config::EngineConfig;
use crate::scene::Scene;
use crate::state::{Blackboard, CameraState, CharacterState};

/// Animator parameter names
pub mod anim {
    pub const SPEED: &str = "Speed";
    pub const ON_AIR: &str = "OnAir";
    pub const JUMP: &str = "Jump";
    pub const RAILING: &str = "Railing";
    pub const ATTACK_INDEX: &str = "AttackIndex";
    pub const WEAK_ATTACK: &str = "WeakAttack";
    pub const HEAVY_ATTACK: &str = "HeavyAttack";
    /// Root-motion curve sampled while an attack drives velocity
    pub const FORWARD_MOVEMENT: &str = "ForwardMovement";
}

/// Animation state machine parameters
pub trait AnimationDriver {
    fn set_trigger(&mut self, name: &str);
    fn set_bool(&mut self, name: &str, value: bool);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_integer(&mut self, name: &str, value: i32);
    fn get_float(&self, name: &str) -> f32;
}

/// Camera shake presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShakePreset {
    Landing,
    SmallSmash,
    BigSmash,
}

/// Visual feedback. Everything here is fire-and-forget.
pub trait EffectsSink {
    /// Show or hide the character model
    fn set_character_visible(&mut self, visible: bool);
    fn set_dash_trail(&mut self, active: bool);
    /// Place the grapple hand, or hide it with `None`
    fn set_grapple_hand(&mut self, pose: Option<Transform>);
    fn set_grapple_highlight(&mut self, point: EntityId, highlighted: bool);
    fn set_grind_sparks(&mut self, active: bool);
    fn shake(&mut self, preset: ShakePreset);
    fn ground_smash(&mut self, position: Vec3);
    fn landing_burst(&mut self, position: Vec3);
    fn hit_burst(&mut self, position: Vec3);
}

/// Animation driver that accepts everything and reports zero
#[derive(Debug, Default)]
pub struct NullAnimation;

impl AnimationDriver for NullAnimation {
    fn set_trigger(&mut self, _name: &str) {}
    fn set_bool(&mut self, _name: &str, _value: bool) {}
    fn set_float(&mut self, _name: &str, _value: f32) {}
    fn set_integer(&mut self, _name: &str, _value: i32) {}
    fn get_float(&self, _name: &str) -> f32 {
        0.0
    }
}

/// Effects sink that draws nothing
#[derive(Debug, Default)]
pub struct NullEffects;

impl EffectsSink for NullEffects {
    fn set_character_visible(&mut self, _visible: bool) {}
    fn set_dash_trail(&mut self, _active: bool) {}
    fn set_grapple_hand(&mut self, _pose: Option<Transform>) {}
    fn set_grapple_highlight(&mut self, _point: EntityId, _highlighted: bool) {}
    fn set_grind_sparks(&mut self, _active: bool) {}
    fn shake(&mut self, _preset: ShakePreset) {}
    fn ground_smash(&mut self, _position: Vec3) {}
    fn landing_burst(&mut self, _position: Vec3) {}
    fn hit_burst(&mut self, _position: Vec3) {}
}

/// Host-owned collaborators for one engine call
pub struct Collaborators<'a> {
    pub physics: &'a mut dyn CharacterPhysics,
    pub animation: &'a mut dyn AnimationDriver,
    pub audio: &'a mut dyn AudioSink,
    pub effects: &'a mut dyn EffectsSink,
    pub scene: &'a mut Scene,
}

/// Everything a controller may touch during one input or tick call.
pub struct TickContext<'a> {
    pub character: &'a mut CharacterState,
    pub camera: &'a mut CameraState,
    pub config: &'a EngineConfig,

    pub physics: &'a mut dyn CharacterPhysics,
    pub animation: &'a mut dyn AnimationDriver,
    pub audio: &'a mut dyn AudioSink,
    pub effects: &'a mut dyn EffectsSink,
    pub scene: &'a mut Scene,

    /// Fixed tick length
    pub dt: f32,
}

impl<'a> TickContext<'a> {
    pub fn new(
        board: &'a mut Blackboard,
        config: &'a EngineConfig,
        collab: &'a mut Collaborators<'_>,
    ) -> Self {
        Self {
            character: &mut board.character,
            camera: &mut board.camera,
            config,
            physics: &mut *collab.physics,
            animation: &mut *collab.animation,
            audio: &mut *collab.audio,
            effects: &mut *collab.effects,
            scene: &mut *collab.scene,
            dt: config.tick_length,
        }
    }

    /// Audio subject for the character
    pub fn subject(&self) -> EntityId {
        self.character.id
    }

    pub fn post_audio(&mut self, event: &str) {
        let subject = self.character.id;
        self.audio.post_event(event, subject);
    }

    pub fn set_audio_switch(&mut self, group: &str, value: &str) {
        let subject = self.character.id;
        self.audio.set_switch(group, value, subject);
    }

    /// Hide the model and turn invincible, or the reverse. The two always
    /// change together.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.character.invincible = hidden;
        self.effects.set_character_visible(!hidden);
    }

    /// Turn the body to face `direction` on the ground plane
    pub fn face(&mut self, direction: Vec3) {
        if let Some(rotation) = Transform::rotation_towards(momentum_core::planar(direction)) {
            self.physics.set_rotation(rotation);
        }
    }

    /// Character transform as reported by the rigid body
    pub fn character_transform(&self) -> Transform {
        Transform::from_position_rotation(self.physics.position(), self.physics.rotation())
    }
}
