// src/config.rs

//! Defines the configuration structures for the filmgrain renderer.
//!
//! This module provides a set of structs that can be deserialized from a
//! JSON configuration file to customize the overlay's appearance and the
//! demo host's refresh cadence. Default values reproduce the stock look of
//! the overlay: a faint, slowly shifting grain over a white fill.
//!
//! Every grain parameter has a documented domain; `GrainConfig::normalized`
//! clamps a configuration into those domains and is applied whenever an
//! animation loop captures its config.

// Serde is used for deserializing the configuration from a file.
// The `Serialize` trait is also derived for convenience, allowing the
// current configuration to be exported if needed.
use anyhow::{Context, Result};
use log::warn;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::color::Color;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "FILMGRAIN_CONFIG";

/// Process-wide configuration.
///
/// Loaded once, from the file named by `FILMGRAIN_CONFIG` when set,
/// otherwise defaults. A file that fails to load logs a warning and falls
/// back to defaults rather than aborting startup.
pub static CONFIG: Lazy<Config> = Lazy::new(|| match std::env::var(CONFIG_ENV_VAR) {
    Ok(path) => Config::load(Path::new(&path)).unwrap_or_else(|e| {
        warn!("Config: failed to load '{}': {:#}. Using defaults.", path, e);
        Config::default()
    }),
    Err(_) => Config::default(),
});

// --- Top-Level Configuration Structure ---

/// Represents the complete configuration for the overlay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(default)] // Apply default values for the entire struct if a field is missing.
pub struct Config {
    /// Grain appearance settings.
    pub grain: GrainConfig,
    /// Animation host settings.
    pub animation: AnimationConfig,
}

impl Config {
    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

// --- Grain Configuration ---

/// Appearance and cadence of the grain layer.
///
/// Captured immutably by each running animation loop; changing any field
/// takes effect through a scheduler restart, never mid-loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GrainConfig {
    /// Noise amplitude. Domain [5, 50]; values outside are clamped.
    pub intensity: u8,
    /// Regeneration rate input. Domain [1.0, 10.0]; higher is faster.
    pub speed: f64,
    /// Compositing alpha for the grain layer. Domain [0.0, 1.0];
    /// subtle values around 0.01-0.2 are the intended range.
    pub opacity: f32,
    /// Opaque fill painted beneath the grain layer.
    pub background: Color,
}

impl Default for GrainConfig {
    fn default() -> Self {
        GrainConfig {
            intensity: 20,
            speed: 3.0,
            opacity: 0.05,
            background: Color::default(),
        }
    }
}

impl GrainConfig {
    /// Returns a copy with every field clamped into its documented domain.
    pub fn normalized(self) -> Self {
        GrainConfig {
            intensity: self
                .intensity
                .clamp(crate::grain::MIN_INTENSITY, crate::grain::MAX_INTENSITY),
            speed: self.speed.clamp(1.0, 10.0),
            opacity: self.opacity.clamp(0.0, 1.0),
            background: self.background,
        }
    }
}

// --- Animation Configuration ---

/// Settings for the demo host's refresh-signal source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Target refresh rate in frames per second. Clamped to [1, 240] by the
    /// vsync actor.
    pub target_fps: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig { target_fps: 60 }
    }
}
