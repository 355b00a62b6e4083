//! Event resolution: event name + per-subject switch state -> what to play

use std::collections::HashMap;
use std::path::PathBuf;

use momentum_core::EntityId;

use crate::config::{AudioConfig, EventSpec};

/// A clip to start
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    pub clip: PathBuf,
    pub looping: bool,
    pub volume: f64,
}

/// The outcome of posting one event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolved {
    /// Looping event to stop first
    pub stop: Option<String>,
    pub play: Option<Playback>,
}

/// Event table plus the switch and parameter state of every subject
#[derive(Debug, Clone, Default)]
pub struct EventBank {
    events: HashMap<String, EventSpec>,
    sound_root: PathBuf,
    switches: HashMap<(EntityId, String), String>,
    parameters: HashMap<(EntityId, String), f32>,
}

impl EventBank {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            events: config.events.clone(),
            sound_root: config.sound_root.clone(),
            switches: HashMap::new(),
            parameters: HashMap::new(),
        }
    }

    pub fn set_switch(&mut self, group: &str, value: &str, subject: EntityId) {
        self.switches
            .insert((subject, group.to_string()), value.to_string());
    }

    pub fn switch(&self, group: &str, subject: EntityId) -> Option<&str> {
        self.switches
            .get(&(subject, group.to_string()))
            .map(String::as_str)
    }

    pub fn set_parameter(&mut self, name: &str, value: f32, subject: EntityId) {
        self.parameters.insert((subject, name.to_string()), value);
    }

    pub fn parameter(&self, name: &str, subject: EntityId) -> Option<f32> {
        self.parameters.get(&(subject, name.to_string())).copied()
    }

    /// Resolve `name` for `subject`. Unknown events resolve to `None`.
    pub fn resolve(&self, name: &str, subject: EntityId) -> Option<Resolved> {
        let spec = self.events.get(name)?;

        let variant = spec
            .switch
            .as_deref()
            .and_then(|group| self.switch(group, subject))
            .and_then(|value| spec.variants.get(value));

        let play = variant.or(spec.clip.as_ref()).map(|clip| Playback {
            clip: self.sound_root.join(clip),
            looping: spec.looping,
            volume: spec.volume,
        });

        Some(Resolved {
            stop: spec.stops.clone(),
            play,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue;

    fn bank() -> EventBank {
        let mut config = AudioConfig::default();
        config.sound_root = PathBuf::from("root");
        let hit = config
            .events
            .get_mut(cue::PUNCH_HIT)
            .expect("default punch hit event");
        hit.variants
            .insert("Grunt".to_string(), PathBuf::from("sfx/hit_grunt.ogg"));
        EventBank::new(&config)
    }

    #[test]
    fn test_unknown_event() {
        assert!(bank().resolve("nope", EntityId::new()).is_none());
    }

    #[test]
    fn test_switch_selects_variant_per_subject() {
        let mut bank = bank();
        let player = EntityId::new();
        let other = EntityId::new();
        bank.set_switch(cue::HIT, "Grunt", player);

        let resolved = bank.resolve(cue::PUNCH_HIT, player).expect("known event");
        assert_eq!(
            resolved.play.map(|p| p.clip),
            Some(PathBuf::from("root/sfx/hit_grunt.ogg"))
        );

        let resolved = bank.resolve(cue::PUNCH_HIT, other).expect("known event");
        assert_eq!(
            resolved.play.map(|p| p.clip),
            Some(PathBuf::from("root/sfx/punch_hit.ogg"))
        );
    }

    #[test]
    fn test_unmatched_switch_falls_back() {
        let mut bank = bank();
        let player = EntityId::new();
        bank.set_switch(cue::HIT, cue::HIT_GRAPPLE_POINT, player);

        let resolved = bank.resolve(cue::PUNCH_HIT, player).expect("known event");
        assert_eq!(
            resolved.play.map(|p| p.clip),
            Some(PathBuf::from("root/sfx/punch_hit.ogg"))
        );
    }

    #[test]
    fn test_stop_event_names_loop() {
        let bank = bank();
        let resolved = bank
            .resolve(cue::RAIL_STOP, EntityId::new())
            .expect("known event");
        assert_eq!(resolved.stop.as_deref(), Some(cue::RAIL_START));

        let start = bank
            .resolve(cue::RAIL_START, EntityId::new())
            .expect("known event");
        assert!(start.play.is_some_and(|p| p.looping));
    }

    #[test]
    fn test_parameters_are_per_subject() {
        let mut bank = bank();
        let player = EntityId::new();
        bank.set_parameter(cue::MOVE_SPEED, 4.5, player);
        assert_eq!(bank.parameter(cue::MOVE_SPEED, player), Some(4.5));
        assert_eq!(bank.parameter(cue::MOVE_SPEED, EntityId::new()), None);
    }
}
