use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cue;

/// How one named event sounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSpec {
    /// Clip played when no switch variant applies
    pub clip: Option<PathBuf>,
    /// Switch group whose value picks a variant
    pub switch: Option<String>,
    /// Clip per switch value
    pub variants: HashMap<String, PathBuf>,
    /// Keep playing until stopped by another event
    pub looping: bool,
    /// Event whose looping sound this event stops
    pub stops: Option<String>,
    /// Volume multiplier applied on top of the sfx volume
    pub volume: f64,
}

impl Default for EventSpec {
    fn default() -> Self {
        Self {
            clip: None,
            switch: None,
            variants: HashMap::new(),
            looping: false,
            stops: None,
            volume: 1.0,
        }
    }
}

impl EventSpec {
    /// A one-shot clip at full volume
    pub fn one_shot(clip: impl Into<PathBuf>) -> Self {
        Self {
            clip: Some(clip.into()),
            ..Default::default()
        }
    }
}

/// Audio configuration: volumes plus the event table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master volume multiplier (0.0–1.0).
    pub master_volume: f64,
    /// Sound effects volume multiplier (0.0–1.0).
    pub sfx_volume: f64,
    /// Directory clip paths are relative to
    pub sound_root: PathBuf,
    /// Event name to sound description
    pub events: HashMap<String, EventSpec>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        let mut events = HashMap::new();
        events.insert(cue::DASH.to_string(), EventSpec::one_shot("sfx/dash.ogg"));
        events.insert(
            cue::GRAPPLE_START.to_string(),
            EventSpec::one_shot("sfx/grapple_start.ogg"),
        );
        events.insert(
            cue::RAIL_START.to_string(),
            EventSpec {
                looping: true,
                ..EventSpec::one_shot("sfx/rail_loop.ogg")
            },
        );
        events.insert(
            cue::RAIL_STOP.to_string(),
            EventSpec {
                stops: Some(cue::RAIL_START.to_string()),
                ..EventSpec::one_shot("sfx/rail_stop.ogg")
            },
        );
        events.insert(cue::WEAK_ATTACK.to_string(), EventSpec::one_shot("sfx/punch.ogg"));
        events.insert(
            cue::HEAVY_ATTACK.to_string(),
            EventSpec::one_shot("sfx/heavy_punch.ogg"),
        );
        events.insert(
            cue::PUNCH_HIT.to_string(),
            EventSpec {
                switch: Some(cue::HIT.to_string()),
                ..EventSpec::one_shot("sfx/punch_hit.ogg")
            },
        );

        Self {
            master_volume: 1.0,
            sfx_volume: 1.0,
            sound_root: PathBuf::from("assets/audio"),
            events,
        }
    }
}

impl AudioConfig {
    /// Effective SFX volume (master * sfx).
    pub fn effective_sfx_volume(&self) -> f64 {
        self.master_volume * self.sfx_volume
    }
}
