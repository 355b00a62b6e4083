//! Engine wiring errors. Gameplay itself never fails; only a misconfigured
//! engine does.

use thiserror::Error;

use crate::action::ActionKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("handler {0:?} appears more than once in the tick order")]
    DuplicateHandler(ActionKind),

    #[error("handler {0:?} is missing from the tick order")]
    MissingHandler(ActionKind),

    #[error("handler {before:?} must tick before {after:?}")]
    OrderViolation {
        before: ActionKind,
        after: ActionKind,
    },
}
