//! Easing curves mapping normalized time to progress

use serde::{Deserialize, Serialize};

/// Preset easing curves selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurveType {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseOutExpo,
    SmoothStep,
}

impl CurveType {
    /// All presets, in declaration order
    pub const ALL: [CurveType; 9] = [
        CurveType::Linear,
        CurveType::EaseInQuad,
        CurveType::EaseOutQuad,
        CurveType::EaseInOutQuad,
        CurveType::EaseInCubic,
        CurveType::EaseOutCubic,
        CurveType::EaseInOutCubic,
        CurveType::EaseOutExpo,
        CurveType::SmoothStep,
    ];

    /// Evaluate the curve at `t`. Input is clamped to [0, 1] and every preset
    /// maps 0 to 0 and 1 to 1.
    pub fn evaluate(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            CurveType::Linear => t,
            CurveType::EaseInQuad => t * t,
            CurveType::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            CurveType::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            CurveType::EaseInCubic => t * t * t,
            CurveType::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            CurveType::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            CurveType::EaseOutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            CurveType::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}
