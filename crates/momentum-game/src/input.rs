//! Named input events delivered to the engine
//!
//! Devices are mapped to action names upstream; the engine only sees the
//! name, the phase and an optional 2D payload.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Lifecycle of an input action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputPhase {
    /// Button pressed or stick left the dead zone
    Started,
    /// Stick value changed while held
    Changed,
    /// Button released or stick returned to rest
    Canceled,
}

/// One input notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Binding name, resolved through the dispatch bindings
    pub action: String,
    pub phase: InputPhase,
    /// Stick or pointer value, if the action carries one
    pub payload: Option<Vec2>,
}

impl InputEvent {
    pub fn new(action: impl Into<String>, phase: InputPhase, payload: Option<Vec2>) -> Self {
        Self {
            action: action.into(),
            phase,
            payload,
        }
    }

    /// Button press
    pub fn started(action: impl Into<String>) -> Self {
        Self::new(action, InputPhase::Started, None)
    }

    /// Button release
    pub fn canceled(action: impl Into<String>) -> Self {
        Self::new(action, InputPhase::Canceled, None)
    }

    /// Axis update
    pub fn axis(action: impl Into<String>, phase: InputPhase, value: Vec2) -> Self {
        Self::new(action, phase, Some(value))
    }

    /// Payload, or zero for buttons and canceled axes
    pub fn value(&self) -> Vec2 {
        match self.phase {
            InputPhase::Canceled => Vec2::ZERO,
            _ => self.payload.unwrap_or(Vec2::ZERO),
        }
    }
}
