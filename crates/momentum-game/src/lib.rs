//! Momentum Game - Character coordination engine
//!
//! Movement, dash, grapple, rail grinding, melee combat and a three-mode
//! camera, all reading and writing one shared blackboard and driven by the
//! [`Engine`] on a fixed tick.

pub mod action;
pub mod camera;
pub mod checkpoint;
pub mod collab;
pub mod combat;
pub mod config;
pub mod dash;
pub mod engine;
pub mod error;
pub mod grapple;
pub mod grind;
pub mod input;
pub mod movement;
pub mod scene;
pub mod state;

#[cfg(test)]
mod test_support;

pub use action::{validate_order, ActionKind};
pub use checkpoint::{Checkpoint, CheckpointTrack};
pub use collab::{
    AnimationDriver, Collaborators, EffectsSink, NullAnimation, NullEffects, ShakePreset,
    TickContext,
};
pub use combat::{AttackElement, AttackKind, HitSide, SmashSize};
pub use config::{
    AttackConfig, CameraConfig, CharacterConfig, CombatConfig, DispatchConfig, EngineConfig,
    KarnageConfig, Lens,
};
pub use dash::DashPhase;
pub use engine::Engine;
pub use error::EngineError;
pub use grapple::GrapplePhase;
pub use input::{InputEvent, InputPhase};
pub use scene::{Enemy, GrapplePoint, RailPath, Scene};
pub use state::{Blackboard, CameraMode, CameraState, CharacterState, MovementState};
