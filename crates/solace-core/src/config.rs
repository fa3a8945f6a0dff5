//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `solace-config.yaml` next to the
//! binary. This module defines strongly-typed structs that mirror the
//! YAML structure and provides a loader that reads the file; a missing
//! file means defaults throughout.

use std::path::Path;

use serde::Deserialize;

use solace_sim::{DriftConfig, FollowerConfig};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SolaceConfig {
    /// Frame timing and bookkeeping intervals.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Follower steering tunables.
    #[serde(default)]
    pub follower: FollowerConfig,

    /// Token drift tunables.
    #[serde(default)]
    pub drift: DriftConfig,

    /// Save-file location.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl SolaceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// The frame duration in seconds derived from the tick interval.
    #[allow(clippy::cast_precision_loss)]
    pub fn frame_dt(&self) -> f32 {
        self.engine.tick_interval_ms as f32 / 1000.0
    }
}

/// Frame timing and bookkeeping intervals.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Real-time milliseconds per frame.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Frames between periodic autosaves.
    #[serde(default = "default_autosave_interval_ticks")]
    pub autosave_interval_ticks: u64,

    /// Frames a new token's texts stay mutable after spawn.
    #[serde(default = "default_text_lock_ticks")]
    pub text_lock_ticks: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            autosave_interval_ticks: default_autosave_interval_ticks(),
            text_lock_ticks: default_text_lock_ticks(),
        }
    }
}

/// Save-file location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Path of the single save file, overwritten wholesale on save.
    #[serde(default = "default_save_path")]
    pub save_path: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_path: default_save_path(),
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    33
}

const fn default_autosave_interval_ticks() -> u64 {
    120
}

const fn default_text_lock_ticks() -> u32 {
    30
}

fn default_save_path() -> String {
    String::from("solace-save.json")
}
