//! Configuration file support for the interval timer.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/intervals/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub audio: AudioConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Playback timing parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_start_countdown_secs")]
    pub start_countdown_secs: u32,

    #[serde(default = "default_transition_countdown_secs")]
    pub transition_countdown_secs: u32,

    #[serde(default = "default_warning_thresholds_secs")]
    pub warning_thresholds_secs: Vec<u32>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            start_countdown_secs: default_start_countdown_secs(),
            transition_countdown_secs: default_transition_countdown_secs(),
            warning_thresholds_secs: default_warning_thresholds_secs(),
        }
    }
}

impl PlaybackConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Audible cue parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_audio_enabled")]
    pub enabled: bool,

    #[serde(default = "default_countdown_hz")]
    pub countdown_hz: u32,

    #[serde(default = "default_go_hz")]
    pub go_hz: u32,

    #[serde(default = "default_warning_hz")]
    pub warning_hz: u32,

    #[serde(default = "default_tone_ms")]
    pub tone_ms: u32,

    #[serde(default = "default_go_tone_ms")]
    pub go_tone_ms: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: default_audio_enabled(),
            countdown_hz: default_countdown_hz(),
            go_hz: default_go_hz(),
            warning_hz: default_warning_hz(),
            tone_ms: default_tone_ms(),
            go_tone_ms: default_go_tone_ms(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir);
    base.join("intervals")
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_start_countdown_secs() -> u32 {
    5
}

fn default_transition_countdown_secs() -> u32 {
    3
}

fn default_warning_thresholds_secs() -> Vec<u32> {
    vec![3, 2, 1]
}

fn default_audio_enabled() -> bool {
    true
}

fn default_countdown_hz() -> u32 {
    660
}

fn default_go_hz() -> u32 {
    880
}

fn default_warning_hz() -> u32 {
    520
}

fn default_tone_ms() -> u32 {
    150
}

fn default_go_tone_ms() -> u32 {
    400
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(std::env::temp_dir);
        base.join("intervals").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.playback.tick_interval_ms == 0 {
            return Err(Error::Config("tick_interval_ms must be positive".into()));
        }
        if self.playback.tick_interval_ms > 1000 {
            return Err(Error::Config(
                "tick_interval_ms must not exceed one second".into(),
            ));
        }
        Ok(())
    }
}
