// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for walkseq.
//!
//! A session file carries the generation and playback settings the command
//! line would otherwise take: scale, pattern length, tempo, an optional
//! seed and the render sample rate. Files are YAML unless they end in
//! `.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::generators::walk::{DEFAULT_LENGTH, DEFAULT_SCALE};
use crate::music::ScaleRegistry;
use crate::timing::{MAX_BPM, MIN_BPM, REFERENCE_BPM};

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Registry key of the scale to walk (e.g. "c_major")
    #[serde(default = "default_scale")]
    pub scale: String,
    /// Number of notes per pattern
    #[serde(default = "default_length")]
    pub length: i64,
    /// Tempo in BPM (60-180)
    #[serde(default = "default_tempo")]
    pub tempo: f64,
    /// Seed for reproducible patterns; random when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Sample rate for rendered audio
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_scale() -> String {
    DEFAULT_SCALE.to_string()
}
fn default_length() -> i64 {
    DEFAULT_LENGTH
}
fn default_tempo() -> f64 {
    REFERENCE_BPM
}
fn default_sample_rate() -> u32 {
    44100
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            length: default_length(),
            tempo: default_tempo(),
            seed: None,
            sample_rate: default_sample_rate(),
        }
    }
}

impl SessionConfig {
    /// Load a session from a YAML or TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Parse a session from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a session from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Check the settings against the scale registry and accepted ranges
    pub fn validate(&self, registry: &ScaleRegistry) -> crate::Result<()> {
        if !registry.contains(&self.scale) {
            return Err(crate::Error::InvalidScale(self.scale.clone()));
        }
        if self.length <= 0 {
            return Err(crate::Error::InvalidLength(self.length));
        }
        if !self.tempo.is_finite() || !(MIN_BPM..=MAX_BPM).contains(&self.tempo) {
            return Err(crate::Error::InvalidTempo(self.tempo));
        }
        if self.sample_rate == 0 {
            return Err(crate::Error::InvalidSampleRate(self.sample_rate));
        }
        Ok(())
    }
}
