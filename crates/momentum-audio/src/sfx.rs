use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use kira::manager::backend::DefaultBackend;
use kira::manager::AudioManager;
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings};
use kira::sound::PlaybackState;
use kira::tween::Tween;

use crate::bank::Playback;
use crate::error::AudioError;

/// Plays resolved clips, caching decoded data and tracking named loops.
pub struct SfxPlayer {
    cache: HashMap<PathBuf, StaticSoundData>,
    one_shots: Vec<StaticSoundHandle>,
    loops: HashMap<String, StaticSoundHandle>,
    sfx_volume: f64,
}

impl SfxPlayer {
    pub fn new(sfx_volume: f64) -> Self {
        Self {
            cache: HashMap::new(),
            one_shots: Vec::new(),
            loops: HashMap::new(),
            sfx_volume,
        }
    }

    /// Start a clip. Looping clips are remembered under `event` so a later
    /// event can stop them; starting the same loop twice restarts it.
    pub fn play(
        &mut self,
        manager: &mut AudioManager<DefaultBackend>,
        event: &str,
        playback: &Playback,
    ) -> Result<(), AudioError> {
        let data = self.load_or_cache(&playback.clip)?;
        let mut settings = StaticSoundSettings::new().volume(self.sfx_volume * playback.volume);
        if playback.looping {
            settings = settings.loop_region(..);
        }
        let handle = manager
            .play(data.with_settings(settings))
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;

        if playback.looping {
            if let Some(mut previous) = self.loops.insert(event.to_string(), handle) {
                fade_out(&mut previous, Duration::from_millis(50));
            }
        } else {
            self.one_shots.push(handle);
        }
        Ok(())
    }

    /// Fade out the loop started by `event`, if any
    pub fn stop_loop(&mut self, event: &str, fade: Duration) {
        if let Some(mut handle) = self.loops.remove(event) {
            fade_out(&mut handle, fade);
        }
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.sfx_volume = volume;
    }

    /// Remove handles for sounds that have stopped playing.
    pub fn cleanup(&mut self) {
        self.one_shots.retain(|h| h.state() != PlaybackState::Stopped);
        self.loops.retain(|_, h| h.state() != PlaybackState::Stopped);
    }

    fn load_or_cache(&mut self, path: &Path) -> Result<StaticSoundData, AudioError> {
        if let Some(data) = self.cache.get(path) {
            return Ok(data.clone());
        }
        let data = StaticSoundData::from_file(path)
            .map_err(|e| AudioError::LoadFailed(path.to_path_buf(), e.to_string()))?;
        self.cache.insert(path.to_path_buf(), data.clone());
        Ok(data)
    }
}

fn fade_out(handle: &mut StaticSoundHandle, duration: Duration) {
    handle.stop(Tween {
        duration,
        ..Default::default()
    });
}
