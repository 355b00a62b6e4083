//! Momentum Core - Shared primitives for the Momentum action engine
//!
//! This crate provides the foundational types used throughout the engine:
//! - Mathematical primitives (re-exported from glam)
//! - Entity handles and the character/camera transform
//! - Fixed-step game time
//! - Easing curves and countdown timers used by gameplay state machines

pub mod easing;
pub mod time;
pub mod timer;
pub mod types;

pub use easing::CurveType;
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use time::{GameTime, TimeConfig};
pub use timer::Countdown;
pub use types::{planar, signed_angle_y, EntityId, Transform};
