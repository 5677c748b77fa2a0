//! Configuration — instrument defaults and OSC settings loaded from ~/.theremin/config.yaml.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::OutputSettings;
use crate::control::Handedness;
use crate::instrument::oscillator::DEFAULT_AMPLITUDE;
use crate::instrument::{Key, RangeSpan};
use crate::osc::OscConfig;
use crate::theremin::{SessionSettings, DEFAULT_NOTE_TOLERANCE_CENTS};

/// Errors reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Instrument configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThereminConfig {
    pub key: Key,
    pub range: RangeSpan,
    pub quantize: bool,
    pub handedness: Handedness,
    /// Initial amplitude, `[0, 1]`.
    pub amplitude: f32,
    /// How far from a note the readout still names it.
    pub note_tolerance_cents: f32,
    /// Override the device sample rate.
    pub sample_rate: Option<u32>,
    /// Fixed device buffer size in frames.
    pub buffer_size: Option<u32>,
    pub osc: OscConfig,
}

impl Default for ThereminConfig {
    fn default() -> Self {
        Self {
            key: Key::default(),
            range: RangeSpan::default(),
            quantize: false,
            handedness: Handedness::default(),
            amplitude: DEFAULT_AMPLITUDE,
            note_tolerance_cents: DEFAULT_NOTE_TOLERANCE_CENTS,
            sample_rate: None,
            buffer_size: None,
            osc: OscConfig::default(),
        }
    }
}

impl ThereminConfig {
    /// Standard config location, `~/.theremin/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".theremin").join("config.yaml"))
    }

    /// Load from the standard path.
    /// Returns None if the file doesn't exist or can't be parsed.
    pub fn load() -> Option<Self> {
        let path = Self::default_path()?;
        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(ConfigError::Io { .. }) => None,
            Err(e) => {
                log::warn!("{e}; using defaults");
                None
            }
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            key: self.key,
            range: self.range,
            quantize: self.quantize,
            handedness: self.handedness,
            amplitude: self.amplitude,
            note_tolerance_cents: self.note_tolerance_cents,
        }
    }

    pub fn output_settings(&self) -> OutputSettings {
        OutputSettings {
            sample_rate: self.sample_rate,
            buffer_size: self.buffer_size,
        }
    }
}
