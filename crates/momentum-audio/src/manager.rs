use std::time::Duration;

use kira::manager::backend::DefaultBackend;
use kira::manager::{AudioManager, AudioManagerSettings};
use momentum_core::EntityId;
use tracing::{info, trace, warn};

use crate::bank::EventBank;
use crate::config::AudioConfig;
use crate::error::AudioError;
use crate::sfx::SfxPlayer;
use crate::sink::AudioSink;

const LOOP_FADE: Duration = Duration::from_millis(150);

/// The kira-backed audio engine. Posting events never fails from the
/// caller's point of view; backend errors are logged.
pub struct AudioEngine {
    manager: AudioManager<DefaultBackend>,
    sfx: SfxPlayer,
    bank: EventBank,
    config: AudioConfig,
}

impl AudioEngine {
    /// Create a new AudioEngine with the given config.
    pub fn new(config: AudioConfig) -> Result<Self, AudioError> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| AudioError::InitFailed(e.to_string()))?;

        info!(events = config.events.len(), "Audio engine initialized");

        Ok(Self {
            manager,
            sfx: SfxPlayer::new(config.effective_sfx_volume()),
            bank: EventBank::new(&config),
            config,
        })
    }

    /// Create an AudioEngine with default configuration.
    pub fn with_default() -> Result<Self, AudioError> {
        Self::new(AudioConfig::default())
    }

    /// Apply new volume settings at runtime.
    pub fn update_volumes(&mut self, master_volume: f64, sfx_volume: f64) {
        self.config.master_volume = master_volume;
        self.config.sfx_volume = sfx_volume;
        self.sfx.set_volume(self.config.effective_sfx_volume());
    }

    /// Call each frame to clean up finished sounds.
    pub fn update(&mut self) {
        self.sfx.cleanup();
    }

    pub fn bank(&self) -> &EventBank {
        &self.bank
    }

    /// Get a reference to the current audio config.
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }
}

impl AudioSink for AudioEngine {
    fn post_event(&mut self, name: &str, subject: EntityId) {
        let Some(resolved) = self.bank.resolve(name, subject) else {
            warn!(event = name, "Unknown audio event");
            return;
        };

        if let Some(stop) = resolved.stop.as_deref() {
            self.sfx.stop_loop(stop, LOOP_FADE);
        }

        if let Some(playback) = resolved.play {
            trace!(event = name, clip = %playback.clip.display(), "post event");
            if let Err(e) = self.sfx.play(&mut self.manager, name, &playback) {
                warn!(event = name, "Audio event failed: {}", e);
            }
        }
    }

    fn set_switch(&mut self, group: &str, value: &str, subject: EntityId) {
        self.bank.set_switch(group, value, subject);
    }

    fn set_parameter(&mut self, name: &str, value: f32, subject: EntityId) {
        self.bank.set_parameter(name, value, subject);
    }
}
