//! Sandbox settings with persistence
//!
//! Settings are saved to `~/.config/momentum/settings.toml`

use std::fs;
use std::path::PathBuf;

use momentum_audio::AudioConfig;
use momentum_game::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Everything the sandbox reads from disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    pub audio: AudioConfig,
    pub sandbox: SandboxSettings,
}

impl Settings {
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("momentum"))
    }

    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!("Failed to parse settings: {}, using defaults", e);
                Self::default()
            }),
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let settings = toml::from_str(content)?;
        info!("Loaded settings");
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// How long and how fast the scripted run goes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    /// Simulated seconds to run
    pub duration: f32,
    /// Simulated render frame length fed to the clock
    pub frame_delta: f32,
    /// Time scale multiplier (affects gameplay speed)
    pub time_scale: f32,
    /// Ticks between state summaries
    pub log_interval: u64,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            duration: 10.0,
            frame_delta: 1.0 / 60.0,
            time_scale: 1.0,
            log_interval: 50,
        }
    }
}
