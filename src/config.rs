//! Voice settings persistence
//!
//! The four knobs the voice pipeline cares about, stored as TOML in the
//! platform config directory. Everything else (themes, window layout, ...)
//! belongs to the UI collaborator.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::constants::{DEFAULT_PTT_KEY, DEFAULT_SAMPLES_PER_PACKET};
use crate::error::{Error, Result};

/// Voice-related user settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Transmission mode name: `"cont"` or `"ptt"`
    pub voice_mode: String,
    /// Push-to-talk key combination
    pub ptt_key: String,
    /// Opus bitrate in bits per second; `None` = automatic
    pub audio_bitrate: Option<u32>,
    /// Samples per outbound packet at 48kHz
    pub samples_per_packet: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            voice_mode: "cont".to_string(),
            ptt_key: DEFAULT_PTT_KEY.to_string(),
            audio_bitrate: None,
            samples_per_packet: DEFAULT_SAMPLES_PER_PACKET,
        }
    }
}

impl Settings {
    /// Packet duration implied by `samples_per_packet`
    pub fn ms_per_packet(&self) -> f32 {
        self.samples_per_packet as f32 / 48.0
    }

    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "voice-uplink").map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Load settings from disk, falling back to defaults when the file is
    /// missing or unreadable
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("invalid settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist settings to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| Error::Config("no config directory available".to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(&path, raw)?;
        Ok(())
    }
}
