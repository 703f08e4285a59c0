//! Runtime configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings read once per program load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Screen width in pixels, published to programs as `screenWidth`
    pub screen_width: f64,
    /// Screen height in pixels, published to programs as `screenHeight`
    pub screen_height: f64,
    /// Turtle glide speed in pixels per second; 0 moves instantly
    pub turtle_speed: f64,
    /// Iterations a single loop may run before it is stopped
    pub max_loop_iterations: usize,
    /// Nested user function calls allowed before a stack overflow error
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            screen_width: 1280.0,
            screen_height: 720.0,
            turtle_speed: 250.0,
            max_loop_iterations: 250,
            max_call_depth: 1000,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Read a TOML config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}
