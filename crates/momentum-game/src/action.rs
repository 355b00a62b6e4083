//! The closed set of action handlers and their tick order

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One action handler. Every handler has an input entry point and a per-tick
/// update; some of them leave one of the two empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Movement,
    Sprint,
    Jump,
    Dash,
    Grapple,
    Grind,
    WeakAttack,
    HeavyAttack,
    /// Combo and karnage timers
    Combat,
    CameraFree,
    CameraTargeted,
    CameraGrind,
    CameraReset,
}

impl ActionKind {
    /// Every handler, in the default tick order
    pub const DEFAULT_ORDER: [ActionKind; 13] = [
        ActionKind::Movement,
        ActionKind::Sprint,
        ActionKind::Jump,
        ActionKind::Dash,
        ActionKind::Grapple,
        ActionKind::Grind,
        ActionKind::WeakAttack,
        ActionKind::HeavyAttack,
        ActionKind::Combat,
        ActionKind::CameraFree,
        ActionKind::CameraTargeted,
        ActionKind::CameraGrind,
        ActionKind::CameraReset,
    ];

    /// Handlers that move the character
    const MOVERS: [ActionKind; 4] = [
        ActionKind::Movement,
        ActionKind::Dash,
        ActionKind::Grapple,
        ActionKind::Grind,
    ];

    /// Handlers that read the character position to frame the camera
    const FRAMERS: [ActionKind; 3] = [
        ActionKind::CameraFree,
        ActionKind::CameraTargeted,
        ActionKind::CameraGrind,
    ];
}

/// Check that `order` names every handler exactly once and that every
/// character mover ticks before every camera mode that frames it.
pub fn validate_order(order: &[ActionKind]) -> Result<(), EngineError> {
    for (i, kind) in order.iter().enumerate() {
        if order[..i].contains(kind) {
            return Err(EngineError::DuplicateHandler(*kind));
        }
    }

    for kind in ActionKind::DEFAULT_ORDER {
        if !order.contains(&kind) {
            return Err(EngineError::MissingHandler(kind));
        }
    }

    let position = |kind: ActionKind| order.iter().position(|k| *k == kind);
    for before in ActionKind::MOVERS {
        for after in ActionKind::FRAMERS {
            if let (Some(b), Some(a)) = (position(before), position(after)) {
                if b > a {
                    return Err(EngineError::OrderViolation { before, after });
                }
            }
        }
    }

    Ok(())
}
