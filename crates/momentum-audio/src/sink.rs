use momentum_core::EntityId;

/// Fire-and-forget audio surface used by gameplay
pub trait AudioSink {
    /// Trigger a named event on behalf of `subject`
    fn post_event(&mut self, name: &str, subject: EntityId);

    /// Select `value` in switch `group` for `subject`
    fn set_switch(&mut self, group: &str, value: &str, subject: EntityId);

    /// Set a continuous parameter for `subject`
    fn set_parameter(&mut self, name: &str, value: f32, subject: EntityId);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn post_event(&mut self, _name: &str, _subject: EntityId) {}

    fn set_switch(&mut self, _group: &str, _value: &str, _subject: EntityId) {}

    fn set_parameter(&mut self, _name: &str, _value: f32, _subject: EntityId) {}
}
