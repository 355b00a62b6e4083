//! Momentum Audio - Event-driven sound using kira
//!
//! Gameplay code posts named events, switches and parameters against a
//! subject through [`AudioSink`]. [`EventBank`] turns those into clips and
//! [`AudioEngine`] plays them.

mod bank;
mod config;
mod error;
mod manager;
mod sfx;
mod sink;

pub use bank::{EventBank, Playback, Resolved};
pub use config::{AudioConfig, EventSpec};
pub use error::AudioError;
pub use manager::AudioEngine;
pub use sink::{AudioSink, NullAudio};

/// Event, switch and parameter names posted by the gameplay engine
pub mod cue {
    pub const DASH: &str = "dash";
    pub const GRAPPLE_START: &str = "grapple_start";
    pub const RAIL_START: &str = "rail_start";
    pub const RAIL_STOP: &str = "rail_stop";
    pub const WEAK_ATTACK: &str = "weak_attack";
    pub const HEAVY_ATTACK: &str = "heavy_attack";
    pub const PUNCH_HIT: &str = "punch_hit";

    /// Switch group selecting the hit material
    pub const HIT: &str = "Hit";
    pub const HIT_GRAPPLE_POINT: &str = "GrPoint";
    /// Switch group selecting the footstep set
    pub const VELOCITY: &str = "Velocity";
    pub const VELOCITY_WALK: &str = "Walk";

    /// Planar speed parameter, posted every grounded movement tick
    pub const MOVE_SPEED: &str = "MoveSpeed";
}
